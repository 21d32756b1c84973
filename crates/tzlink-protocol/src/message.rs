//! Request and response payloads and their encrypted encodings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cipher::{self, CipherError, SharedKey};
use crate::outcome::OutcomeCode;
use crate::request_type::RequestKind;

/// Errors raised while encoding or decoding protocol payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Envelope could not be encrypted or decrypted.
    #[error(transparent)]
    Cipher(#[from] CipherError),
    /// Payload is not the expected JSON shape.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A request as a client sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    /// Qualified request type, `<Registry>.<Member>`.
    pub request_type: String,
    /// Request fields.
    pub data: Map<String, Value>,
}

impl RequestMessage {
    /// Builds a request for a registered kind.
    #[must_use]
    pub fn new(kind: RequestKind, data: Map<String, Value>) -> Self {
        Self {
            request_type: kind.qualified_name(),
            data,
        }
    }

    /// Builds a request carrying a single `userId` field.
    #[must_use]
    pub fn for_user(kind: RequestKind, user_id: u64) -> Self {
        let mut data = Map::new();
        data.insert("userId".to_owned(), Value::from(user_id));
        Self::new(kind, data)
    }

    /// Builds a request carrying a single `alias` field.
    #[must_use]
    pub fn for_alias(kind: RequestKind, alias: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("alias".to_owned(), Value::String(alias.into()));
        Self::new(kind, data)
    }
}

/// A response as the daemon sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Looked-up value on success, reason phrase otherwise.
    pub message: String,
    /// Outcome code.
    pub code: OutcomeCode,
}

impl ResponseMessage {
    /// Successful response carrying `message`.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: OutcomeCode::Ok,
        }
    }

    /// Error response whose message is the outcome's reason phrase.
    #[must_use]
    pub fn failure(code: OutcomeCode) -> Self {
        Self {
            message: code.reason().to_owned(),
            code,
        }
    }
}

/// Serialises and encrypts a request.
///
/// # Errors
///
/// Returns a [`ProtocolError`] if serialisation or encryption fails.
pub fn encode_request(request: &RequestMessage, key: &SharedKey) -> Result<Vec<u8>, ProtocolError> {
    encode(request, key)
}

/// Serialises and encrypts a response.
///
/// # Errors
///
/// Returns a [`ProtocolError`] if serialisation or encryption fails.
pub fn encode_response(
    response: &ResponseMessage,
    key: &SharedKey,
) -> Result<Vec<u8>, ProtocolError> {
    encode(response, key)
}

/// Decrypts and parses a response envelope.
///
/// # Errors
///
/// Returns a [`ProtocolError`] if the envelope does not decrypt or the payload
/// is not a response object.
pub fn decode_response(envelope: &[u8], key: &SharedKey) -> Result<ResponseMessage, ProtocolError> {
    let text = cipher::decrypt(envelope, key)?;
    Ok(serde_json::from_str(&text)?)
}

fn encode<T: Serialize>(payload: &T, key: &SharedKey) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(payload)?;
    Ok(cipher::encrypt(&json, key)?)
}
