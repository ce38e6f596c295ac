use std::fmt;

use causa_resolve::{ConflictEngine, ConflictResolver, Resolution, Resolved, SelfResolving, TypeResolver, WriteBackReport};
use causa_types::{CausalToken, Location, OperationResult, StoredObject};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientResult;
use crate::session::Session;

/// How a read's bytes are turned into the output value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Decode through the JSON codec.
    Json,
    /// Hand the bytes through untouched.
    Raw,
}

/// Turns the bytes of a read into `T`, either as a new value or into a slot.
pub(crate) struct Decoder<T> {
    decode: fn(&[u8], &str) -> ClientResult<T>,
    decode_into: fn(&[u8], &str, &mut T) -> ClientResult<()>,
}

impl<T: DeserializeOwned> Decoder<T> {
    pub(crate) fn json() -> Self {
        Self {
            decode: decode_json::<T>,
            decode_into: decode_json_into::<T>,
        }
    }
}

impl Decoder<Vec<u8>> {
    pub(crate) fn raw() -> Self {
        Self {
            decode: decode_raw,
            decode_into: decode_raw_into,
        }
    }
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8], key: &str) -> ClientResult<T> {
    Ok(causa_codec::decode(bytes, key)?)
}

fn decode_json_into<T: DeserializeOwned>(bytes: &[u8], key: &str, slot: &mut T) -> ClientResult<()> {
    Ok(causa_codec::decode_into(bytes, key, slot)?)
}

fn decode_raw(bytes: &[u8], _key: &str) -> ClientResult<Vec<u8>> {
    Ok(bytes.to_vec())
}

fn decode_raw_into(bytes: &[u8], _key: &str, slot: &mut Vec<u8>) -> ClientResult<()> {
    slot.clear();
    slot.extend_from_slice(bytes);
    Ok(())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A ready-to-run write of one object.
#[derive(Clone, Debug)]
pub struct StoreCommand {
    location: Location,
    object: StoredObject,
}

impl StoreCommand {
    pub(crate) fn new(location: Location, object: StoredObject) -> Self {
        Self { location, object }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The object that will be sent.
    pub fn object(&self) -> &StoredObject {
        &self.object
    }

    pub async fn run(self, session: &Session) -> ClientResult<OperationResult> {
        debug!(location = %self.location, indexes = self.object.index_count(), "store");
        let resp = session.transport().store(&self.location, self.object).await?;
        Ok(OperationResult::found(resp.key, resp.causal_token))
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// The outcome of a read.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched<T> {
    pub result: OperationResult,
    /// `None` when the key was not found.
    pub value: Option<T>,
    /// Siblings the store returned (0 when not found).
    pub sibling_count: usize,
    /// Set when a conflict was resolved; reports the persisting write.
    pub write_back: Option<WriteBackReport>,
}

impl<T> Fetched<T> {
    fn not_found(key: &str) -> Self {
        Self {
            result: OperationResult::not_found(key),
            value: None,
            sibling_count: 0,
            write_back: None,
        }
    }

    fn resolved(key: String, value: Option<T>, resolved: Resolved) -> Self {
        Self {
            result: OperationResult::found(key, resolved.causal_token),
            value,
            sibling_count: resolved.sibling_count,
            write_back: resolved.write_back,
        }
    }
}

/// A ready-to-run read of one key.
pub struct GetCommand<T> {
    location: Location,
    key: String,
    mode: Mode,
    decoder: Decoder<T>,
    resolver: Option<Box<dyn ConflictResolver>>,
    fallback: Option<Box<dyn ConflictResolver>>,
}

impl<T> GetCommand<T> {
    pub(crate) fn new(location: Location, key: String, mode: Mode, decoder: Decoder<T>) -> Self {
        Self {
            location,
            key,
            mode,
            decoder,
            resolver: None,
            fallback: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Resolve siblings with `resolver`. Takes precedence over the output
    /// type's own resolver.
    pub fn conflict_resolver(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Read the key, resolving siblings if needed, and decode the result.
    ///
    /// A missing key is not an error: the result has `found == false`.
    pub async fn run(self, session: &Session) -> ClientResult<Fetched<T>> {
        let Some(resolved) = self.fetch_resolved(session).await? else {
            return Ok(Fetched::not_found(&self.key));
        };
        let value = (self.decoder.decode)(&resolved.value, &self.key)?;
        Ok(Fetched::resolved(self.key, Some(value), resolved))
    }

    /// Like [`Self::run`], but decodes into `slot`.
    ///
    /// The slot is only assigned on success with a found value.
    pub async fn run_into(self, session: &Session, slot: &mut T) -> ClientResult<Fetched<()>> {
        let Some(resolved) = self.fetch_resolved(session).await? else {
            return Ok(Fetched::not_found(&self.key));
        };
        (self.decoder.decode_into)(&resolved.value, &self.key, slot)?;
        Ok(Fetched::resolved(self.key, None, resolved))
    }

    /// `None` when the key holds nothing.
    async fn fetch_resolved(&self, session: &Session) -> ClientResult<Option<Resolved>> {
        let resp = session.transport().fetch(&self.location).await?;
        if resp.not_found {
            debug!(location = %self.location, "not found");
            return Ok(None);
        }

        let engine = ConflictEngine::new(session.transport(), &session.config().engine);
        let resolution = engine
            .resolve(
                &self.location,
                resp.siblings,
                self.resolver.as_deref(),
                self.fallback.as_deref(),
            )
            .await?;

        match resolution {
            Resolution::NotFound => Ok(None),
            Resolution::Value(resolved) => {
                debug!(
                    location = %self.location,
                    mode = ?self.mode,
                    siblings = resolved.sibling_count,
                    "fetched"
                );
                Ok(Some(resolved))
            }
        }
    }
}

impl<T> fmt::Debug for GetCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetCommand")
            .field("location", &self.location)
            .field("key", &self.key)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T: SelfResolving + 'static> GetCommand<T> {
    /// Fall back to `T`'s own resolver when no explicit one is set.
    pub fn self_resolving(mut self) -> Self {
        self.fallback = Some(Box::new(TypeResolver::<T>::new()));
        self
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct DeleteCommand {
    location: Location,
    key: String,
    causal_token: CausalToken,
}

impl DeleteCommand {
    pub(crate) fn new(location: Location, key: String, causal_token: CausalToken) -> Self {
        Self {
            location,
            key,
            causal_token,
        }
    }

    /// `found` is `false` when nothing was stored under the key, or when
    /// every remaining sibling is concurrent with the token.
    pub async fn run(self, session: &Session) -> ClientResult<OperationResult> {
        debug!(location = %self.location, "delete");
        let removed = session.transport().delete(&self.location, &self.causal_token).await?;
        if !removed {
            return Ok(OperationResult::not_found(self.key));
        }
        Ok(OperationResult::found(self.key, self.causal_token))
    }
}

// ---------------------------------------------------------------------------
// Index query
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct IndexQueryCommand {
    location: Location,
    index: String,
    value: String,
}

impl IndexQueryCommand {
    pub(crate) fn new(location: Location, index: String, value: String) -> Self {
        Self { location, index, value }
    }

    /// Matching keys, sorted.
    pub async fn run(self, session: &Session) -> ClientResult<Vec<String>> {
        let keys = session
            .transport()
            .keys_in_index(&self.location.bucket, &self.location.bucket_type, &self.index, &self.value)
            .await?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use causa_resolve::{LastWriteWins, ResolveError};
    use causa_transport::{FetchResponse, InMemoryTransport, StoreResponse, Transport, TransportResult, VectorClock};
    use causa_types::{ConflictCandidate, IndexMap, ResolvedConflict};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::bucket::Bucket;
    use crate::error::ClientError;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
    }
    causa_index::index_fields!(User {});

    /// Keeps the sibling with the longest name.
    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Longest {
        name: String,
    }
    causa_index::index_fields!(Longest {});

    impl SelfResolving for Longest {
        fn resolve_conflict(candidates: &[ConflictCandidate]) -> ResolvedConflict {
            let best = candidates
                .iter()
                .max_by_key(|c| c.value.len())
                .expect("at least two candidates");
            ResolvedConflict::from_candidate(best)
        }
    }

    /// Returns fixed siblings and records every store.
    struct Scripted {
        siblings: Vec<StoredObject>,
        stores: Mutex<Vec<StoredObject>>,
    }

    impl Scripted {
        fn new(siblings: Vec<StoredObject>) -> Arc<Self> {
            Arc::new(Self {
                siblings,
                stores: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn fetch(&self, _location: &Location) -> TransportResult<FetchResponse> {
            Ok(FetchResponse::found(self.siblings.clone()))
        }

        async fn store(&self, location: &Location, object: StoredObject) -> TransportResult<StoreResponse> {
            self.stores.lock().unwrap().push(object);
            Ok(StoreResponse {
                key: location.key_str().to_string(),
                causal_token: CausalToken::from("t3"),
            })
        }

        async fn delete(&self, _location: &Location, _token: &CausalToken) -> TransportResult<bool> {
            Ok(false)
        }

        async fn keys_in_index(&self, _: &str, _: &str, _: &str, _: &str) -> TransportResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn scripted_session(t: &Arc<Scripted>) -> Session {
        Session::with_config(t.clone(), Default::default())
    }

    fn users() -> Bucket {
        Bucket::new("users", "default")
    }

    async fn concurrent_users(store: &InMemoryTransport, a: &str, b: &str) {
        let sa = Session::new(store.handle("writer-a"));
        let sb = Session::new(store.handle("writer-b"));
        users().key("u1").set_json(&User { name: a.into() }).unwrap().run(&sa).await.unwrap();
        users().key("u1").set_json(&User { name: b.into() }).unwrap().run(&sb).await.unwrap();
    }

    #[tokio::test]
    async fn store_and_fetch_single_value() {
        let store = InMemoryTransport::new("app");
        let session = Session::new(store.clone());
        let written = users()
            .key("u1")
            .add_to_index("email", "bob@x.com")
            .set_json(&User { name: "Bob".into() })
            .unwrap()
            .run(&session)
            .await
            .unwrap();
        assert_eq!(written.key, "u1");
        assert!(written.found);

        let fetched = users().key("u1").get_json::<User>().unwrap().run(&session).await.unwrap();
        assert_eq!(fetched.value, Some(User { name: "Bob".into() }));
        assert_eq!(fetched.result.key, "u1");
        assert!(fetched.result.found);
        assert_eq!(fetched.result.causal_token, written.causal_token);
        assert_eq!(fetched.sibling_count, 1);
        assert!(fetched.write_back.is_none());
        assert_eq!(store.store_calls(), 1);

        let keys = users().keys_in_index("email", "bob@x.com").unwrap().run(&session).await.unwrap();
        assert_eq!(keys, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn missing_key_is_not_found_not_error() {
        let session = Session::new(InMemoryTransport::new("app"));
        let fetched = users().key("ghost").get_json::<User>().unwrap().run(&session).await.unwrap();
        assert!(!fetched.result.found);
        assert_eq!(fetched.result.key, "ghost");
        assert!(fetched.value.is_none());
        assert!(fetched.result.causal_token.is_empty());
    }

    #[tokio::test]
    async fn resolver_choice_is_decoded_and_written_back() {
        let t = Scripted::new(vec![
            StoredObject::new(br#""A""#.to_vec()).with_causal_token(CausalToken::from("t1")),
            StoredObject::new(br#""B""#.to_vec()).with_causal_token(CausalToken::from("t2")),
        ]);
        let session = scripted_session(&t);
        let pick_b = |c: &[ConflictCandidate]| ResolvedConflict::from_candidate(&c[1]);

        let fetched = users()
            .key("u1")
            .get_json::<String>()
            .unwrap()
            .conflict_resolver(pick_b)
            .run(&session)
            .await
            .unwrap();
        assert_eq!(fetched.value.as_deref(), Some("B"));
        assert_eq!(fetched.result.causal_token, CausalToken::from("t2"));
        assert_eq!(fetched.sibling_count, 2);
        assert!(fetched.write_back.as_ref().is_some_and(WriteBackReport::is_stored));

        let stores = t.stores.lock().unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].value, br#""B""#);
        assert_eq!(stores[0].causal_token, CausalToken::from("t2"));
    }

    #[tokio::test]
    async fn raw_mode_skips_decoding() {
        let t = Scripted::new(vec![
            StoredObject::new(b"A".to_vec()).with_causal_token(CausalToken::from("t1")),
            StoredObject::new(b"B".to_vec()).with_causal_token(CausalToken::from("t2")),
        ]);
        let session = scripted_session(&t);
        let cmd = users().key("u1").get_raw().unwrap();
        assert_eq!(cmd.mode(), Mode::Raw);
        let fetched = cmd.conflict_resolver(LastWriteWins).run(&session).await.unwrap();
        assert_eq!(fetched.value, Some(b"A".to_vec()));
    }

    #[tokio::test]
    async fn conflict_without_resolver_fails_without_write_back() {
        let store = InMemoryTransport::new("reader");
        concurrent_users(&store, "Ann", "Bob").await;
        let session = Session::new(store.clone());

        let err = users().key("u1").get_json::<User>().unwrap().run(&session).await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(ResolveError::NoResolver { siblings: 2 })));
        assert_eq!(store.store_calls(), 2);
    }

    #[tokio::test]
    async fn explicit_resolver_beats_self_resolving() {
        let store = InMemoryTransport::new("reader");
        let sa = Session::new(store.handle("writer-a"));
        let sb = Session::new(store.handle("writer-b"));
        users().key("u1").set_json(&Longest { name: "Al".into() }).unwrap().run(&sa).await.unwrap();
        users().key("u1").set_json(&Longest { name: "Bartholomew".into() }).unwrap().run(&sb).await.unwrap();
        let session = Session::new(store.clone());

        let shortest = |c: &[ConflictCandidate]| {
            ResolvedConflict::from_candidate(c.iter().min_by_key(|c| c.value.len()).unwrap())
        };
        let fetched = users()
            .key("u1")
            .get_json::<Longest>()
            .unwrap()
            .self_resolving()
            .conflict_resolver(shortest)
            .run(&session)
            .await
            .unwrap();
        assert_eq!(fetched.value.unwrap().name, "Al");
    }

    #[tokio::test]
    async fn self_resolving_type_is_used_as_fallback() {
        let store = InMemoryTransport::new("reader");
        let sa = Session::new(store.handle("writer-a"));
        let sb = Session::new(store.handle("writer-b"));
        users().key("u1").set_json(&Longest { name: "Al".into() }).unwrap().run(&sa).await.unwrap();
        users().key("u1").set_json(&Longest { name: "Bartholomew".into() }).unwrap().run(&sb).await.unwrap();
        let session = Session::new(store.clone());

        let fetched = users()
            .key("u1")
            .get_json::<Longest>()
            .unwrap()
            .self_resolving()
            .run(&session)
            .await
            .unwrap();
        assert_eq!(fetched.value.unwrap().name, "Bartholomew");
    }

    #[tokio::test]
    async fn write_back_supersedes_every_sibling() {
        let store = InMemoryTransport::new("reader");
        concurrent_users(&store, "Ann", "Bob").await;
        let session = Session::new(store.clone());
        let location = Location::new("users", "default").unwrap().with_key("u1");

        let before = store.fetch(&location).await.unwrap();
        assert_eq!(before.siblings.len(), 2);
        let old_tokens: Vec<CausalToken> = before.siblings.iter().map(|s| s.causal_token.clone()).collect();

        let fetched = users()
            .key("u1")
            .get_json::<User>()
            .unwrap()
            .conflict_resolver(LastWriteWins)
            .run(&session)
            .await
            .unwrap();
        assert!(fetched.write_back.as_ref().is_some_and(WriteBackReport::is_stored));

        let after = store.fetch(&location).await.unwrap();
        assert_eq!(after.siblings.len(), 1);
        let new_token = &after.siblings[0].causal_token;
        let new_clock = VectorClock::from_token(new_token).unwrap();
        for old in &old_tokens {
            assert_ne!(new_token, old);
            assert!(new_clock.descends(&VectorClock::from_token(old).unwrap()));
        }

        let again = users().key("u1").get_json::<User>().unwrap().run(&session).await.unwrap();
        assert_eq!(again.sibling_count, 1);
        assert_eq!(again.value, fetched.value);
    }

    #[tokio::test]
    async fn failed_write_back_still_returns_value() {
        let store = InMemoryTransport::new("reader");
        concurrent_users(&store, "Ann", "Bob").await;
        store.set_fail_stores(true);
        let session = Session::new(store.clone());

        let fetched = users()
            .key("u1")
            .get_json::<User>()
            .unwrap()
            .conflict_resolver(LastWriteWins)
            .run(&session)
            .await
            .unwrap();
        assert!(fetched.value.is_some());
        assert!(matches!(fetched.write_back, Some(WriteBackReport::Failed { .. })));
        assert_eq!(store.sibling_count(&Location::new("users", "default").unwrap().with_key("u1")), 2);
    }

    #[tokio::test]
    async fn decode_failure_leaves_slot_untouched() {
        let session = Session::new(InMemoryTransport::new("app"));
        users().key("u1").set_raw(b"[1,2]".to_vec()).unwrap().run(&session).await.unwrap();

        let mut slot = User { name: "kept".into() };
        let err = users()
            .key("u1")
            .get_json::<User>()
            .unwrap()
            .run_into(&session, &mut slot)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Codec(causa_codec::CodecError::Decode { ref key, .. }) if key == "u1"));
        assert_eq!(slot.name, "kept");
    }

    #[tokio::test]
    async fn run_into_fills_slot() {
        let session = Session::new(InMemoryTransport::new("app"));
        users().key("u1").set_json(&User { name: "Bob".into() }).unwrap().run(&session).await.unwrap();

        let mut slot = User::default();
        let meta = users()
            .key("u1")
            .get_json::<User>()
            .unwrap()
            .run_into(&session, &mut slot)
            .await
            .unwrap();
        assert!(meta.result.found);
        assert_eq!(slot.name, "Bob");
    }

    #[tokio::test]
    async fn merged_resolution_keeps_every_sibling_index() {
        let store = InMemoryTransport::new("reader");
        let sa = Session::new(store.handle("writer-a"));
        let sb = Session::new(store.handle("writer-b"));
        users().key("u1").add_to_index("team", "red").set_raw(b"a".to_vec()).unwrap().run(&sa).await.unwrap();
        users().key("u1").add_to_index("team", "blue").set_raw(b"b".to_vec()).unwrap().run(&sb).await.unwrap();
        let session = Session::new(store.clone());

        let merge = |c: &[ConflictCandidate]| {
            let mut value = Vec::new();
            let mut indexes = IndexMap::new();
            for candidate in c {
                value.extend_from_slice(&candidate.value);
                for (name, values) in &candidate.indexes {
                    indexes.entry(name.clone()).or_insert_with(Vec::new).extend(values.iter().cloned());
                }
            }
            ResolvedConflict::new(value, c[0].causal_token.clone()).with_indexes(indexes)
        };
        let mut slot = b"stale".to_vec();
        let meta = users()
            .key("u1")
            .get_raw()
            .unwrap()
            .conflict_resolver(merge)
            .run_into(&session, &mut slot)
            .await
            .unwrap();
        assert_eq!(slot, b"ab");
        assert_eq!(meta.sibling_count, 2);
        assert!(meta.write_back.as_ref().is_some_and(WriteBackReport::is_stored));

        let location = Location::new("users", "default").unwrap().with_key("u1");
        let after = store.fetch(&location).await.unwrap();
        assert_eq!(after.siblings.len(), 1);
        assert_eq!(after.siblings[0].value, b"ab");
        assert_eq!(after.siblings[0].indexes["team"], vec!["red".to_string(), "blue".to_string()]);
    }

    #[test]
    fn get_command_debug_shows_location_and_mode() {
        let cmd = users().key("u1").get_raw().unwrap().conflict_resolver(LastWriteWins);
        let shown = format!("{cmd:?}");
        assert!(shown.starts_with("GetCommand"));
        assert!(shown.contains("u1"));
        assert!(shown.contains("Raw"));
    }

    #[tokio::test]
    async fn read_modify_write_with_token_keeps_one_sibling() {
        let store = InMemoryTransport::new("a");
        let first = Session::new(store.clone());
        let second = Session::new(store.handle("b"));
        users().key("u1").set_json(&User { name: "v1".into() }).unwrap().run(&first).await.unwrap();

        let read = users().key("u1").get_json::<User>().unwrap().run(&second).await.unwrap();
        users()
            .key("u1")
            .causal_token(read.result.causal_token)
            .set_json(&User { name: "v2".into() })
            .unwrap()
            .run(&second)
            .await
            .unwrap();

        let after = users().key("u1").get_json::<User>().unwrap().run(&first).await.unwrap();
        assert_eq!(after.sibling_count, 1);
        assert_eq!(after.value.unwrap().name, "v2");
    }

    #[tokio::test]
    async fn keyless_store_returns_generated_key() {
        let session = Session::new(InMemoryTransport::new("app"));
        let written = users().set_json(&User { name: "anon".into() }).unwrap().run(&session).await.unwrap();
        assert!(!written.key.is_empty());
        let fetched = users().key(written.key.clone()).get_json::<User>().unwrap().run(&session).await.unwrap();
        assert_eq!(fetched.value.unwrap().name, "anon");
    }

    #[tokio::test]
    async fn delete_then_read_is_not_found() {
        let session = Session::new(InMemoryTransport::new("app"));
        let written = users().key("u1").set_raw(b"x".to_vec()).unwrap().run(&session).await.unwrap();
        let deleted = users()
            .key("u1")
            .causal_token(written.causal_token)
            .delete()
            .unwrap()
            .run(&session)
            .await
            .unwrap();
        assert_eq!(deleted.key, "u1");
        assert!(deleted.found);
        let fetched = users().key("u1").get_raw().unwrap().run(&session).await.unwrap();
        assert!(!fetched.result.found);
    }

    #[tokio::test]
    async fn deleting_a_missing_key_reports_not_found() {
        let session = Session::new(InMemoryTransport::new("app"));
        let deleted = users().key("ghost").delete().unwrap().run(&session).await.unwrap();
        assert_eq!(deleted.key, "ghost");
        assert!(!deleted.found);
    }

    #[tokio::test]
    async fn session_bucket_uses_default_bucket_type() {
        let store = InMemoryTransport::new("app");
        let config = crate::config::ClientConfig {
            default_bucket_type: "maps".into(),
            ..Default::default()
        };
        let session = Session::with_config(Arc::new(store.clone()), config);
        session.bucket("users").key("u1").set_raw(b"x".to_vec()).unwrap().run(&session).await.unwrap();
        let location = Location::new("users", "maps").unwrap().with_key("u1");
        assert_eq!(store.sibling_count(&location), 1);
    }
}
