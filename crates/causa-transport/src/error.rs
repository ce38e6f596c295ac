use thiserror::Error;

/// Errors raised by a storage transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The store refused or failed the request.
    #[error("request failed: {0}")]
    Request(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A causal token was not issued by this store.
    #[error("invalid causal token: {0}")]
    InvalidToken(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
