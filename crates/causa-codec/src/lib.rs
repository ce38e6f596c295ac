//! Value codec for causa.
//!
//! Structured values are stored as JSON: textual, self-describing and
//! schema-less, so records written by an older shape of a type stay
//! readable after fields are added. Raw reads and writes bypass this crate.

pub mod codec;
pub mod error;

pub use codec::{decode, decode_into, encode, JSON_CONTENT_TYPE, RAW_CONTENT_TYPE};
pub use error::{CodecError, CodecResult};
