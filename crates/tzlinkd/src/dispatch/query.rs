//! Validated lookups, one variant per registered request kind.

use serde_json::{Map, Value};

use tzlink_protocol::RequestKind;

use crate::store::{StoreError, TimezoneStore};

use super::errors::DispatchError;

const USER_ID_FIELD: &str = "userId";
const ALIAS_FIELD: &str = "alias";

/// A request whose fields passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Timezone of a user, falling back to the default timezone.
    Timezone {
        /// Looked-up user.
        user_id: u64,
    },
    /// Alias of a user.
    Alias {
        /// Looked-up user.
        user_id: u64,
    },
    /// User holding an alias.
    UserFromAlias {
        /// Looked-up alias.
        alias: String,
    },
    /// Timezone of the user holding an alias.
    TimezoneFromAlias {
        /// Looked-up alias.
        alias: String,
    },
}

impl Query {
    /// Validates `data` for a timezone-by-user lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidField`] when `userId` is missing or
    /// not a non-negative integer.
    pub fn timezone(data: &Value) -> Result<Self, DispatchError> {
        Ok(Self::Timezone {
            user_id: user_id(fields(data)?)?,
        })
    }

    /// Validates `data` for an alias-by-user lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidField`] when `userId` is invalid.
    pub fn alias(data: &Value) -> Result<Self, DispatchError> {
        Ok(Self::Alias {
            user_id: user_id(fields(data)?)?,
        })
    }

    /// Validates `data` for a user-by-alias lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidField`] when `alias` is missing, empty
    /// or not a string.
    pub fn user_from_alias(data: &Value) -> Result<Self, DispatchError> {
        Ok(Self::UserFromAlias {
            alias: alias(fields(data)?)?,
        })
    }

    /// Validates `data` for a timezone-by-alias lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidField`] when `alias` is invalid.
    pub fn timezone_from_alias(data: &Value) -> Result<Self, DispatchError> {
        Ok(Self::TimezoneFromAlias {
            alias: alias(fields(data)?)?,
        })
    }

    /// Request kind this query answers.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::Timezone { .. } => RequestKind::Timezone,
            Self::Alias { .. } => RequestKind::Alias,
            Self::UserFromAlias { .. } => RequestKind::UserFromAlias,
            Self::TimezoneFromAlias { .. } => RequestKind::TimezoneFromAlias,
        }
    }

    /// Runs the lookup and returns the response message.
    ///
    /// Empty stored values count as absent. A user without a timezone gets
    /// `default_timezone`; every other absence is [`DispatchError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotFound`] or [`DispatchError::Store`].
    pub async fn respond(
        &self,
        store: &dyn TimezoneStore,
        default_timezone: &str,
    ) -> Result<String, DispatchError> {
        match self {
            Self::Timezone { user_id } => {
                let zone = present(store.timezone(*user_id).await)?;
                Ok(zone.unwrap_or_else(|| default_timezone.to_owned()))
            }
            Self::Alias { user_id } => {
                present(store.alias(*user_id).await)?.ok_or_else(|| DispatchError::not_found("alias"))
            }
            Self::UserFromAlias { alias } => store
                .user_by_alias(alias)
                .await
                .map_err(DispatchError::Store)?
                .map(|user_id| user_id.to_string())
                .ok_or_else(|| DispatchError::not_found("user")),
            Self::TimezoneFromAlias { alias } => present(store.timezone_by_alias(alias).await)?
                .ok_or_else(|| DispatchError::not_found("timezone")),
        }
    }
}

fn present(
    lookup: Result<Option<String>, StoreError>,
) -> Result<Option<String>, DispatchError> {
    lookup
        .map(|value| value.filter(|text| !text.is_empty()))
        .map_err(DispatchError::Store)
}

fn fields(data: &Value) -> Result<&Map<String, Value>, DispatchError> {
    data.as_object()
        .ok_or_else(|| DispatchError::invalid_field("data", "expected a JSON object"))
}

fn user_id(fields: &Map<String, Value>) -> Result<u64, DispatchError> {
    let invalid = |message: &str| DispatchError::invalid_field(USER_ID_FIELD, message);
    match fields.get(USER_ID_FIELD) {
        None => Err(invalid("missing")),
        Some(Value::Number(number)) => number
            .as_u64()
            .ok_or_else(|| invalid("expected a non-negative integer")),
        Some(Value::String(text)) if is_decimal(text) => text
            .parse()
            .map_err(|_| invalid("integer out of range")),
        Some(_) => Err(invalid("expected a non-negative integer")),
    }
}

fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn alias(fields: &Map<String, Value>) -> Result<String, DispatchError> {
    match fields.get(ALIAS_FIELD) {
        Some(Value::String(alias)) if !alias.is_empty() => Ok(alias.clone()),
        Some(Value::String(_)) => Err(DispatchError::invalid_field(ALIAS_FIELD, "must not be empty")),
        Some(_) => Err(DispatchError::invalid_field(ALIAS_FIELD, "expected a string")),
        None => Err(DispatchError::invalid_field(ALIAS_FIELD, "missing")),
    }
}
