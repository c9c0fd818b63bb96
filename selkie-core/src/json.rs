// SPDX-License-Identifier: MIT OR Apache-2.0

//! Utility methods to encode or decode values in JSON format.
//!
//! Signed structures travel between peers as JSON text, both inside encrypted
//! envelopes and on the relay wire.
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Serializes a value into a JSON string.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String, EncodeError> {
    let json = serde_json::to_string(value).map_err(|err| EncodeError::Value(err.to_string()))?;
    Ok(json)
}

/// Deserializes a value which was formatted as JSON.
pub fn decode_json<T: DeserializeOwned>(json: &str) -> Result<T, DecodeError> {
    let value = serde_json::from_str(json).map_err(Into::<DecodeError>::into)?;
    Ok(value)
}

/// An error occurred during JSON serialization.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// An error indicating a value that cannot be serialized.
    ///
    /// Contains a description of the problem delivered from serde.
    #[error("an error occurred while serializing value: {0}")]
    Value(String),
}

/// An error occurred during JSON deserialization.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is not syntactically valid JSON.
    ///
    /// Contains the line and column where the syntax error occurred.
    #[error("invalid JSON syntax at line {0}, column {1}")]
    Syntax(usize, usize),

    /// The input is valid JSON but does not match the expected shape.
    ///
    /// Contains a description of the mismatch delivered from serde.
    #[error("unexpected JSON value: {0}")]
    Data(String),

    /// The input ended before a complete value was read.
    #[error("unexpected end of JSON input")]
    Eof,
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        match value.classify() {
            serde_json::error::Category::Eof => DecodeError::Eof,
            serde_json::error::Category::Syntax | serde_json::error::Category::Io => {
                DecodeError::Syntax(value.line(), value.column())
            }
            serde_json::error::Category::Data => DecodeError::Data(value.to_string()),
        }
    }
}
