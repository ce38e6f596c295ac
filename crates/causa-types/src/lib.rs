//! Object model for causa.
//!
//! This crate holds the plain data exchanged between the client layers and
//! the storage transport. It contains no I/O and no resolution logic.
//!
//! # Key Types
//!
//! - [`CausalToken`] -- Opaque vector-clock bytes issued by the store
//! - [`StoredObject`] -- Value bytes plus causal token, metadata and indexes
//! - [`IndexAssignment`] -- One `(index name, index value)` pair
//! - [`ConflictCandidate`] -- Read-only view of one sibling
//! - [`ResolvedConflict`] -- The value a resolution strategy chose
//! - [`Location`] -- Bucket, bucket type and optional key
//! - [`OperationResult`] -- Outcome of a completed read, write or delete

pub mod candidate;
pub mod error;
pub mod location;
pub mod object;
pub mod result;
pub mod token;

pub use candidate::{ConflictCandidate, ResolvedConflict};
pub use error::TypeError;
pub use location::Location;
pub use object::{IndexAssignment, IndexMap, StoredObject};
pub use result::OperationResult;
pub use token::CausalToken;
