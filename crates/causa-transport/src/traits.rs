use async_trait::async_trait;
use causa_types::{CausalToken, Location, StoredObject};

use crate::error::TransportResult;

/// Everything the store holds under one key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// Every sibling, in the order the store returned them.
    pub siblings: Vec<StoredObject>,
    pub not_found: bool,
}

impl FetchResponse {
    pub fn not_found() -> Self {
        Self {
            siblings: Vec::new(),
            not_found: true,
        }
    }

    pub fn found(siblings: Vec<StoredObject>) -> Self {
        Self {
            not_found: siblings.is_empty(),
            siblings,
        }
    }
}

/// Acknowledgement of a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreResponse {
    /// The key written (generated by the store when none was given).
    pub key: String,
    /// The causal token now covering the key.
    pub causal_token: CausalToken,
}

/// Transport to a vector-clocked key/value store.
///
/// Implementations must satisfy these invariants:
/// - `store` with a token that descends existing siblings replaces them;
///   one that does not is kept next to them as a new sibling.
/// - `fetch` never invents or drops a causal token.
/// - Errors are returned to the caller, never retried here.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch all siblings stored under `location`'s key.
    async fn fetch(&self, location: &Location) -> TransportResult<FetchResponse>;

    /// Store one object. `object.causal_token` states what it supersedes.
    ///
    /// When `location` has no key the store generates one.
    async fn store(&self, location: &Location, object: StoredObject) -> TransportResult<StoreResponse>;

    /// Delete the siblings covered by `causal_token` (all of them if empty).
    ///
    /// Returns `false` when nothing under the key was removed.
    async fn delete(&self, location: &Location, causal_token: &CausalToken) -> TransportResult<bool>;

    /// Keys in `bucket`/`bucket_type` whose objects carry `index = value`.
    async fn keys_in_index(
        &self,
        bucket: &str,
        bucket_type: &str,
        index: &str,
        value: &str,
    ) -> TransportResult<Vec<String>>;
}
