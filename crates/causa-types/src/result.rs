use serde::{Deserialize, Serialize};

use crate::token::CausalToken;

/// Outcome of a completed read, write or delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The key operated on (generated by the store for keyless writes).
    pub key: String,
    /// The causal token of the value read or written.
    pub causal_token: CausalToken,
    /// `false` when a read found no value under the key.
    pub found: bool,
}

impl OperationResult {
    pub fn found(key: impl Into<String>, causal_token: CausalToken) -> Self {
        Self {
            key: key.into(),
            causal_token,
            found: true,
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            causal_token: CausalToken::empty(),
            found: false,
        }
    }
}
