//! Payload serialization

use crate::error::{Error, Result};
use crate::Serializer;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// The default serializer, producing compact JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    /// Creates a JSON serializer
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn to_bytes<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::PayloadEncoding(e.to_string()))
    }

    fn from_bytes<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| Error::PayloadEncoding(e.to_string()))
    }
}
