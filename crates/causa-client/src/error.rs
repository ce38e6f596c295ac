use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("index mapping error: {0}")]
    Mapping(#[from] causa_index::IndexError),

    #[error(transparent)]
    Codec(#[from] causa_codec::CodecError),

    #[error("conflict error: {0}")]
    Conflict(#[from] causa_resolve::ResolveError),

    #[error("transport error: {0}")]
    Transport(#[from] causa_transport::TransportError),

    #[error("invalid location: {0}")]
    Location(#[from] causa_types::TypeError),

    #[error("no key given for {0}")]
    MissingKey(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
