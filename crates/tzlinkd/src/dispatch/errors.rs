//! Error types for request dispatch failures.
//!
//! Every variant maps to the outcome code reported to the client; the
//! variant itself only reaches the logs.

use std::io;

use thiserror::Error;

use tzlink_protocol::{CipherError, OutcomeCode};

use crate::store::StoreError;

/// Reasons a request did not produce a value.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Reading the envelope failed.
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),

    /// The envelope did not decrypt.
    #[error("failed to decrypt request: {0}")]
    Decode(#[from] CipherError),

    /// The payload is not a JSON object.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// Description of the defect.
        message: String,
        /// Parser error, when there was one.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A field of `data` failed validation.
    #[error("invalid field '{field}': {message}")]
    InvalidField {
        /// Offending field.
        field: &'static str,
        /// Description of the defect.
        message: String,
    },

    /// `requestType` or `data` is missing, or the type is not registered.
    #[error("unresolved request type: {message}")]
    UnresolvedType {
        /// Description of what could not be resolved.
        message: String,
    },

    /// The lookup found no record.
    #[error("no {what} found")]
    NotFound {
        /// Looked-up item.
        what: &'static str,
    },

    /// The record store could not answer.
    #[error("record lookup failed: {0}")]
    Store(#[source] StoreError),
}

impl DispatchError {
    /// Outcome code reported to the client.
    ///
    /// Store failures are indistinguishable from missing records on the
    /// wire.
    #[must_use]
    pub const fn outcome(&self) -> OutcomeCode {
        match self {
            Self::Read(_)
            | Self::Decode(_)
            | Self::MalformedPayload { .. }
            | Self::InvalidField { .. } => OutcomeCode::BadRequest,
            Self::NotFound { .. } | Self::Store(_) => OutcomeCode::NotFound,
            Self::UnresolvedType { .. } => OutcomeCode::MethodNotAllowed,
        }
    }

    /// Creates a malformed payload error from a parser error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedPayload {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed payload error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Creates an unresolved request type error.
    pub fn unresolved(message: impl Into<String>) -> Self {
        Self::UnresolvedType {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub const fn not_found(what: &'static str) -> Self {
        Self::NotFound { what }
    }
}
