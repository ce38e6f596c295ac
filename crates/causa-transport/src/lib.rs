//! Storage transport interface for causa.
//!
//! The client layers only ever talk to the store through the [`Transport`]
//! trait: fetch every sibling under a key, store one object, delete, and
//! query a secondary index. Network transports live outside this workspace.
//!
//! # Backends
//!
//! - [`InMemoryTransport`] -- `HashMap`-based store with real vector-clock
//!   sibling semantics, for tests and embedding
//!
//! # Design Rules
//!
//! 1. Causal tokens are opaque to callers; only the store reads them.
//! 2. A store whose token descends existing siblings replaces them.
//! 3. Concurrent stores are kept side by side as siblings.
//! 4. Errors are propagated unchanged; this layer does not retry.

pub mod clock;
pub mod error;
pub mod memory;
pub mod traits;

pub use clock::VectorClock;
pub use error::{TransportError, TransportResult};
pub use memory::InMemoryTransport;
pub use traits::{FetchResponse, StoreResponse, Transport};
