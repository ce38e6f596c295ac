use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque causal version marker (a vector clock) issued by the store.
///
/// The client never interprets the bytes. It only carries them from a read
/// to the write that supersedes it, so the store can tell that the write
/// descends from the versions it replaced. An empty token means "no known
/// history" and is only legal on a first write.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CausalToken(Vec<u8>);

impl CausalToken {
    /// Wrap raw token bytes as returned by the store.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The empty token.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if the token carries no history.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the token and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Short hex representation (first 8 characters at most).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for CausalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "CausalToken(empty)")
        } else {
            write!(f, "CausalToken({})", self.short_hex())
        }
    }
}

impl fmt::Display for CausalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for CausalToken {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for CausalToken {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for CausalToken {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}
