//! Sibling conflict resolution for causa.
//!
//! A read may return several siblings for one key. The engine decides
//! whether resolution is needed, picks a strategy, validates what it
//! returns, and writes the chosen value back with the chosen causal token so
//! the store records it as a descendant of every sibling.
//!
//! ```text
//! NoResult ──► SingleValue ──────────────► (value, token)
//!         └──► MultiValue ──► strategy ──► Resolved ──► write-back
//!                                     └──► Failed
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod write_back;

pub use config::{EngineConfig, WriteBackPolicy};
pub use engine::{choose, Choice, ConflictEngine, Resolution, Resolved};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{ConflictResolver, LastWriteWins, SelfResolving, TypeResolver};
pub use write_back::{write_back, WriteBackReport};
