//! Secondary index derivation for causa.
//!
//! A stored object carries index entries from two sources: assignments the
//! caller adds explicitly, and fields of the value named in the value type's
//! [`Indexed`] table. Field shapes are read from the value's serde
//! representation, so no runtime reflection is involved.
//!
//! ```
//! use causa_index::{derive_indexes, index_fields};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { name: String, tags: Vec<String> }
//!
//! index_fields!(User { name => "name_bin", tags => "tag_bin" });
//!
//! let user = User { name: "bob".into(), tags: vec!["a".into(), "b".into()] };
//! let derived = derive_indexes(&[], &user).unwrap();
//! assert_eq!(derived.len(), 3);
//! ```

pub mod derive;
pub mod error;
pub mod field;

pub use derive::{derive_from_tree, derive_indexes, FieldShape};
pub use error::{IndexError, IndexResult};
pub use field::{IndexField, Indexed};
