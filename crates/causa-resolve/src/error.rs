use thiserror::Error;

/// Errors that make a conflicted read fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Several siblings exist and no strategy is available.
    #[error("conflict with {siblings} siblings but no conflict resolver")]
    NoResolver { siblings: usize },

    /// The strategy returned an outcome that cannot be written back.
    #[error("invalid resolution: {0}")]
    InvalidResolution(&'static str),
}

/// Result alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;
