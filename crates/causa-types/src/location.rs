use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Where a value lives: bucket, bucket type and (optionally) key.
///
/// A store addressed without a key asks the store to generate one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub bucket: String,
    pub bucket_type: String,
    pub key: Option<String>,
}

impl Location {
    /// Address a bucket without a key.
    pub fn new(bucket: impl Into<String>, bucket_type: impl Into<String>) -> Result<Self, TypeError> {
        let bucket = bucket.into();
        let bucket_type = bucket_type.into();
        if bucket.is_empty() {
            return Err(TypeError::EmptyName("bucket"));
        }
        if bucket_type.is_empty() {
            return Err(TypeError::EmptyName("bucket type"));
        }
        Ok(Self {
            bucket,
            bucket_type,
            key: None,
        })
    }

    /// The same bucket addressed at `key`. An empty key clears it.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = if key.is_empty() { None } else { Some(key) };
        self
    }

    /// The key, or `""` when none is set.
    pub fn key_str(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bucket_type, self.bucket, self.key_str())
    }
}
