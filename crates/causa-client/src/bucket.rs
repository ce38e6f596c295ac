use causa_codec::{JSON_CONTENT_TYPE, RAW_CONTENT_TYPE};
use causa_index::{derive_indexes, Indexed};
use causa_types::{CausalToken, IndexAssignment, Location, StoredObject};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::command::{Decoder, DeleteCommand, GetCommand, IndexQueryCommand, Mode, StoreCommand};
use crate::error::{ClientError, ClientResult};

/// Starting point for every command: a bucket, plus optional key, explicit
/// index assignments, and causal token.
///
/// The terminal methods (`set_json`, `get_raw`, ...) validate everything
/// configured so far and either return a ready command or the first error.
#[derive(Clone, Debug)]
pub struct Bucket {
    name: String,
    bucket_type: String,
    key: Option<String>,
    indexes: Vec<IndexAssignment>,
    causal_token: CausalToken,
}

impl Bucket {
    pub fn new(name: impl Into<String>, bucket_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket_type: bucket_type.into(),
            key: None,
            indexes: Vec::new(),
            causal_token: CausalToken::empty(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = (!key.is_empty()).then_some(key);
        self
    }

    /// Add an explicit index assignment to the next write.
    pub fn add_to_index(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.indexes.push(IndexAssignment::new(name, value));
        self
    }

    /// Write (or delete) as a descendant of the version read with `token`.
    pub fn causal_token(mut self, token: CausalToken) -> Self {
        self.causal_token = token;
        self
    }

    /// Store `value` as JSON, with explicit and field-derived indexes.
    ///
    /// Without a key, the store generates one.
    pub fn set_json<T>(self, value: &T) -> ClientResult<StoreCommand>
    where
        T: Serialize + Indexed + ?Sized,
    {
        let location = self.location()?;
        let assignments = derive_indexes(&self.indexes, value)?;
        let bytes = causa_codec::encode(value)?;
        let mut object = StoredObject::new(bytes)
            .with_content_type(JSON_CONTENT_TYPE)
            .with_causal_token(self.causal_token);
        object.extend_indexes(&assignments);
        Ok(StoreCommand::new(location, object))
    }

    /// Store uninterpreted bytes with the explicit indexes only.
    pub fn set_raw(self, bytes: impl Into<Vec<u8>>) -> ClientResult<StoreCommand> {
        let location = self.location()?;
        let mut object = StoredObject::new(bytes)
            .with_content_type(RAW_CONTENT_TYPE)
            .with_causal_token(self.causal_token);
        object.extend_indexes(&self.indexes);
        Ok(StoreCommand::new(location, object))
    }

    /// Read the key and decode it from JSON into `T`.
    pub fn get_json<T: DeserializeOwned>(self) -> ClientResult<GetCommand<T>> {
        let (location, key) = self.keyed_location()?;
        Ok(GetCommand::new(location, key, Mode::Json, Decoder::json()))
    }

    /// Read the key's bytes without decoding.
    pub fn get_raw(self) -> ClientResult<GetCommand<Vec<u8>>> {
        let (location, key) = self.keyed_location()?;
        Ok(GetCommand::new(location, key, Mode::Raw, Decoder::raw()))
    }

    /// Delete the key (the versions covered by the causal token, if one is set).
    pub fn delete(self) -> ClientResult<DeleteCommand> {
        let causal_token = self.causal_token.clone();
        let (location, key) = self.keyed_location()?;
        Ok(DeleteCommand::new(location, key, causal_token))
    }

    /// List keys in this bucket whose objects carry `index = value`.
    pub fn keys_in_index(self, index: impl Into<String>, value: impl Into<String>) -> ClientResult<IndexQueryCommand> {
        let location = self.location()?;
        Ok(IndexQueryCommand::new(location, index.into(), value.into()))
    }

    fn location(&self) -> ClientResult<Location> {
        let location = Location::new(self.name.clone(), self.bucket_type.clone())?;
        Ok(match &self.key {
            Some(key) => location.with_key(key.clone()),
            None => location,
        })
    }

    fn keyed_location(&self) -> ClientResult<(Location, String)> {
        let location = self.location()?;
        let key = location
            .key
            .clone()
            .ok_or_else(|| ClientError::MissingKey(location.to_string()))?;
        Ok((location, key))
    }
}
