use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::CausalToken;

/// Secondary index entries attached to an object: index name to values.
///
/// Values are kept in insertion order and are not deduplicated here; the
/// store owns deduplication.
pub type IndexMap = BTreeMap<String, Vec<String>>;

/// One `(index name, index value)` pair destined for a stored object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexAssignment {
    pub name: String,
    pub value: String,
}

impl IndexAssignment {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The wire-level representation of one stored value.
///
/// Produced by the store on read (one per sibling) and built by the client
/// for every write. A `StoredObject` handed to the transport is never
/// modified afterwards; a new one is built for each write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// The stored value bytes.
    pub value: Vec<u8>,
    /// MIME type of `value`, if known.
    pub content_type: Option<String>,
    /// Vector clock the object was read with, or will be written with.
    pub causal_token: CausalToken,
    /// When the store last modified this sibling. `None` on writes.
    pub last_modified: Option<DateTime<Utc>>,
    /// Secondary index entries.
    pub indexes: IndexMap,
}

impl StoredObject {
    /// Create an object holding `value` with no history and no indexes.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_causal_token(mut self, token: CausalToken) -> Self {
        self.causal_token = token;
        self
    }

    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    /// Append one value to the named index.
    pub fn add_to_index(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.indexes.entry(name.into()).or_default().push(value.into());
    }

    /// Append every assignment, preserving their order.
    pub fn extend_indexes<'a>(&mut self, assignments: impl IntoIterator<Item = &'a IndexAssignment>) {
        for a in assignments {
            self.add_to_index(a.name.clone(), a.value.clone());
        }
    }

    /// Flatten the index map back into assignments (name order, then value order).
    pub fn index_assignments(&self) -> Vec<IndexAssignment> {
        self.indexes
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| IndexAssignment::new(name.clone(), v.clone())))
            .collect()
    }

    /// Number of index values across all index names.
    pub fn index_count(&self) -> usize {
        self.indexes.values().map(Vec::len).sum()
    }
}
