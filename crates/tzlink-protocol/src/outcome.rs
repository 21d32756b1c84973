//! Outcome codes carried in every response.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of handling one request, serialised as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum OutcomeCode {
    /// The lookup succeeded; the message holds the value.
    Ok,
    /// The envelope or payload could not be decoded or validated.
    BadRequest,
    /// The lookup found nothing.
    NotFound,
    /// The request type is missing or not registered.
    MethodNotAllowed,
}

impl OutcomeCode {
    /// Numeric code as sent on the wire.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
        }
    }

    /// Reason phrase used as the message of error responses.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
        }
    }

    /// Returns `true` for the success code.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.code(), self.reason())
    }
}

impl From<OutcomeCode> for u16 {
    fn from(value: OutcomeCode) -> Self {
        value.code()
    }
}

/// Raised when a response carries a code outside the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown outcome code {0}")]
pub struct UnknownOutcomeCode(pub u16);

impl TryFrom<u16> for OutcomeCode {
    type Error = UnknownOutcomeCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(Self::Ok),
            400 => Ok(Self::BadRequest),
            404 => Ok(Self::NotFound),
            405 => Ok(Self::MethodNotAllowed),
            other => Err(UnknownOutcomeCode(other)),
        }
    }
}
