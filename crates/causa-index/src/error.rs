use thiserror::Error;

/// Errors from deriving index assignments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// An indexed field holds something other than text or a sequence of text.
    #[error("unsupported index field shape: field `{field}` is {shape}")]
    UnsupportedShape { field: String, shape: &'static str },

    /// An indexed field does not appear in the value's serialized form.
    #[error("indexed field `{0}` is missing from the serialized value")]
    MissingField(String),

    /// The value could not be serialized for inspection.
    #[error("cannot inspect value for indexing: {0}")]
    Serialization(String),
}

/// Result alias for index derivation.
pub type IndexResult<T> = Result<T, IndexError>;
