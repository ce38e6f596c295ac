use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object::{IndexMap, StoredObject};
use crate::token::CausalToken;

/// Read-only view of one sibling, handed to a resolution strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCandidate {
    pub value: Vec<u8>,
    pub last_modified: Option<DateTime<Utc>>,
    pub causal_token: CausalToken,
    pub content_type: Option<String>,
    pub indexes: IndexMap,
}

impl From<StoredObject> for ConflictCandidate {
    fn from(obj: StoredObject) -> Self {
        Self {
            value: obj.value,
            last_modified: obj.last_modified,
            causal_token: obj.causal_token,
            content_type: obj.content_type,
            indexes: obj.indexes,
        }
    }
}

/// The value a resolution strategy selected or synthesized.
///
/// The causal token must be non-empty: it is what makes the write-back a
/// descendant of the siblings instead of one more sibling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConflict {
    pub value: Vec<u8>,
    pub causal_token: CausalToken,
    pub content_type: Option<String>,
    pub indexes: IndexMap,
}

impl ResolvedConflict {
    /// A synthesized value (e.g. a merge) carrying the given token.
    pub fn new(value: impl Into<Vec<u8>>, causal_token: CausalToken) -> Self {
        Self {
            value: value.into(),
            causal_token,
            content_type: None,
            indexes: IndexMap::new(),
        }
    }

    /// Keep one sibling as-is, including its content type and indexes.
    pub fn from_candidate(candidate: &ConflictCandidate) -> Self {
        Self {
            value: candidate.value.clone(),
            causal_token: candidate.causal_token.clone(),
            content_type: candidate.content_type.clone(),
            indexes: candidate.indexes.clone(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_indexes(mut self, indexes: IndexMap) -> Self {
        self.indexes = indexes;
        self
    }

    /// Build the object written back to collapse the conflict.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject {
            value: self.value.clone(),
            content_type: self.content_type.clone(),
            causal_token: self.causal_token.clone(),
            last_modified: None,
            indexes: self.indexes.clone(),
        }
    }
}
