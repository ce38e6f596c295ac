//! In-memory vector-clocked store for tests and embedding.
//!
//! [`InMemoryTransport`] keeps siblings per key behind a `RwLock`. Every
//! handle has an actor name; handles created with
//! [`InMemoryTransport::handle`] share data, so writes through two handles
//! without a common token end up as siblings, as with concurrent clients of
//! a real store.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use causa_types::{CausalToken, Location, StoredObject};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::clock::VectorClock;
use crate::error::{TransportError, TransportResult};
use crate::traits::{FetchResponse, StoreResponse, Transport};

type Address = (String, String, String);

#[derive(Debug)]
struct Sibling {
    object: StoredObject,
    clock: VectorClock,
}

#[derive(Debug, Default)]
struct Data {
    values: HashMap<Address, Vec<Sibling>>,
    /// Highest counter issued per actor.
    counters: HashMap<String, u64>,
}

#[derive(Debug, Default)]
struct Shared {
    data: RwLock<Data>,
    fail_stores: AtomicBool,
    store_delay_ms: AtomicU64,
    store_calls: AtomicUsize,
}

/// An in-memory implementation of [`Transport`].
///
/// Data is lost when the last handle is dropped.
#[derive(Clone, Debug)]
pub struct InMemoryTransport {
    actor: String,
    shared: Arc<Shared>,
}

impl InMemoryTransport {
    /// Create an empty store whose writes are attributed to `actor`.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Another client of the same store, writing as `actor`.
    pub fn handle(&self, actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Make every subsequent store fail with a request error.
    pub fn set_fail_stores(&self, fail: bool) {
        self.shared.fail_stores.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent store by `delay`.
    pub fn set_store_delay(&self, delay: Duration) {
        self.shared
            .store_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of store calls made through any handle, including failed ones.
    pub fn store_calls(&self) -> usize {
        self.shared.store_calls.load(Ordering::SeqCst)
    }

    /// Number of siblings currently held under `location`'s key.
    pub fn sibling_count(&self, location: &Location) -> usize {
        let Ok(address) = address(location) else {
            return 0;
        };
        self.read_data()
            .map(|data| data.values.get(&address).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn read_data(&self) -> TransportResult<std::sync::RwLockReadGuard<'_, Data>> {
        self.shared
            .data
            .read()
            .map_err(|e| TransportError::Internal(format!("lock poisoned: {e}")))
    }

    fn write_data(&self) -> TransportResult<std::sync::RwLockWriteGuard<'_, Data>> {
        self.shared
            .data
            .write()
            .map_err(|e| TransportError::Internal(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new("client")
    }
}

fn address(location: &Location) -> TransportResult<Address> {
    let key = location
        .key
        .clone()
        .ok_or_else(|| TransportError::InvalidRequest(format!("no key given for {location}")))?;
    Ok((location.bucket_type.clone(), location.bucket.clone(), key))
}

fn merged_clock(siblings: &[Sibling]) -> VectorClock {
    let mut clock = VectorClock::new();
    for s in siblings {
        clock.merge(&s.clock);
    }
    clock
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn fetch(&self, location: &Location) -> TransportResult<FetchResponse> {
        let address = address(location)?;
        let data = self.read_data()?;
        let Some(siblings) = data.values.get(&address).filter(|s| !s.is_empty()) else {
            debug!(%location, "fetch: not found");
            return Ok(FetchResponse::not_found());
        };

        // Every sibling carries the merged clock, so writing with any of the
        // returned tokens supersedes all of them.
        let token = merged_clock(siblings).to_token()?;
        let objects = siblings
            .iter()
            .map(|s| s.object.clone().with_causal_token(token.clone()))
            .collect::<Vec<_>>();
        debug!(%location, siblings = objects.len(), "fetch");
        Ok(FetchResponse::found(objects))
    }

    async fn store(&self, location: &Location, object: StoredObject) -> TransportResult<StoreResponse> {
        self.shared.store_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.shared.store_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.shared.fail_stores.load(Ordering::SeqCst) {
            return Err(TransportError::Request(format!("store rejected for {location}")));
        }

        let key = location
            .key
            .clone()
            .unwrap_or_else(|| Uuid::now_v7().simple().to_string());
        let mut clock = VectorClock::from_token(&object.causal_token)?;

        let mut data = self.write_data()?;
        let issued = data.counters.entry(self.actor.clone()).or_insert(0);
        let next = (*issued).max(clock.get(&self.actor)) + 1;
        *issued = next;
        clock.set(self.actor.clone(), next);

        let siblings = data
            .values
            .entry((location.bucket_type.clone(), location.bucket.clone(), key.clone()))
            .or_default();
        let before = siblings.len();
        siblings.retain(|s| !clock.descends(&s.clock));
        let superseded = before - siblings.len();

        let stored = StoredObject {
            causal_token: CausalToken::empty(),
            last_modified: Some(Utc::now()),
            ..object
        };
        siblings.push(Sibling { object: stored, clock });

        let causal_token = merged_clock(siblings).to_token()?;
        debug!(
            %location,
            key = %key,
            superseded,
            siblings = siblings.len(),
            actor = %self.actor,
            "store"
        );
        Ok(StoreResponse { key, causal_token })
    }

    async fn delete(&self, location: &Location, causal_token: &CausalToken) -> TransportResult<bool> {
        let address = address(location)?;
        let clock = VectorClock::from_token(causal_token)?;
        let mut data = self.write_data()?;
        let mut removed = 0;
        if let Some(siblings) = data.values.get_mut(&address) {
            let before = siblings.len();
            if clock.is_empty() {
                siblings.clear();
            } else {
                siblings.retain(|s| !clock.descends(&s.clock));
            }
            removed = before - siblings.len();
            if siblings.is_empty() {
                data.values.remove(&address);
            }
        }
        debug!(%location, removed, "delete");
        Ok(removed > 0)
    }

    async fn keys_in_index(
        &self,
        bucket: &str,
        bucket_type: &str,
        index: &str,
        value: &str,
    ) -> TransportResult<Vec<String>> {
        let data = self.read_data()?;
        let keys: BTreeSet<String> = data
            .values
            .iter()
            .filter(|((t, b, _), _)| t == bucket_type && b == bucket)
            .filter(|(_, siblings)| {
                siblings.iter().any(|s| {
                    s.object
                        .indexes
                        .get(index)
                        .is_some_and(|values| values.iter().any(|v| v == value))
                })
            })
            .map(|((_, _, key), _)| key.clone())
            .collect();
        Ok(keys.into_iter().collect())
    }
}
