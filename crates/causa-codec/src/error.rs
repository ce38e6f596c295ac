use thiserror::Error;

/// Errors from converting values to and from stored bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decode error for key `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
