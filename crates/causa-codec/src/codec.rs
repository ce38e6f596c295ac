use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};

/// Content type attached to values written through the codec.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type attached to raw writes.
pub const RAW_CONTENT_TYPE: &str = "application/octet-stream";

/// Serialize a value to JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Deserialize JSON bytes read from `key`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], key: &str) -> CodecResult<T> {
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Deserialize into an existing slot. On error the slot is left as it was.
pub fn decode_into<T: DeserializeOwned>(bytes: &[u8], key: &str, slot: &mut T) -> CodecResult<()> {
    *slot = decode(bytes, key)?;
    Ok(())
}
