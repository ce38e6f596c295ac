//! Client API for causa.
//!
//! Commands are built from a [`Bucket`] and executed against a [`Session`],
//! which holds the shared transport and configuration.
//!
//! ```no_run
//! # async fn demo() -> causa_client::ClientResult<()> {
//! use causa_client::{index_fields, Bucket, InMemoryTransport, LastWriteWins, Session};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User { name: String, email: String }
//! index_fields!(User { email => "email_bin" });
//!
//! let session = Session::new(InMemoryTransport::new("app"));
//! let user = User { name: "Bob".into(), email: "bob@x.com".into() };
//! Bucket::new("users", "default").key("u1").set_json(&user)?.run(&session).await?;
//!
//! let fetched = Bucket::new("users", "default")
//!     .key("u1")
//!     .get_json::<User>()?
//!     .conflict_resolver(LastWriteWins)
//!     .run(&session)
//!     .await?;
//! assert!(fetched.result.found);
//! # Ok(())
//! # }
//! ```

pub mod bucket;
pub mod command;
pub mod config;
pub mod error;
pub mod session;

pub use bucket::Bucket;
pub use command::{DeleteCommand, Fetched, GetCommand, IndexQueryCommand, Mode, StoreCommand};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::Session;

// Re-export key types
pub use causa_index::{index_fields, IndexField, Indexed};
pub use causa_resolve::{ConflictResolver, LastWriteWins, SelfResolving, WriteBackReport};
pub use causa_transport::{InMemoryTransport, Transport};
pub use causa_types::{CausalToken, ConflictCandidate, IndexAssignment, OperationResult, ResolvedConflict};
