//! Decoded request payloads.

use serde_json::Value;

use tzlink_protocol::OutcomeCode;

use crate::notify::ErrorEvent;

use super::errors::DispatchError;

/// A decrypted payload that is known to be a JSON object.
///
/// Fields are kept as raw values so failed requests can be reported to
/// observers exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IncomingRequest {
    request_type: Option<Value>,
    data: Option<Value>,
}

impl IncomingRequest {
    /// Parses decrypted text into a request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedPayload`] if the text is not JSON or
    /// is JSON but not an object.
    pub(crate) fn parse(text: &str) -> Result<Self, DispatchError> {
        let value: Value = serde_json::from_str(text).map_err(DispatchError::from_json_error)?;
        let Value::Object(mut fields) = value else {
            return Err(DispatchError::malformed("payload is not a JSON object"));
        };
        Ok(Self {
            request_type: fields.remove("requestType"),
            data: fields.remove("data"),
        })
    }

    /// Member half of `requestType`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnresolvedType`] unless `requestType` is a
    /// string with exactly one dot.
    pub(crate) fn member(&self) -> Result<&str, DispatchError> {
        let request_type = match &self.request_type {
            Some(Value::String(name)) => name.as_str(),
            Some(_) => return Err(DispatchError::unresolved("requestType is not a string")),
            None => return Err(DispatchError::unresolved("requestType is missing")),
        };
        match request_type.split_once('.') {
            Some((_, member)) if !member.contains('.') => Ok(member),
            _ => Err(DispatchError::unresolved(format!(
                "requestType '{request_type}' is not of the form Registry.Member"
            ))),
        }
    }

    /// The `data` value.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnresolvedType`] when `data` is missing.
    pub(crate) fn data(&self) -> Result<&Value, DispatchError> {
        self.data
            .as_ref()
            .ok_or_else(|| DispatchError::unresolved("data is missing"))
    }

    /// `requestType` as text, when it was a string.
    pub(crate) fn request_type(&self) -> Option<&str> {
        self.request_type.as_ref().and_then(Value::as_str)
    }

    /// Snapshot handed to error observers.
    pub(crate) fn error_event(&self, code: OutcomeCode) -> ErrorEvent {
        ErrorEvent {
            request_type: self.request_type().map(str::to_owned),
            data: self.data.clone(),
            code,
        }
    }
}
