//! Names of the registered request types.
//!
//! On the wire a request type is written `<Registry>.<Member>`. Clients use
//! [`REGISTRY_NAME`] as the registry half; the daemon only matches the
//! member half.

use std::fmt;

/// Registry prefix clients put in front of a member name.
pub const REGISTRY_NAME: &str = "RequestType";

/// One of the lookups the daemon answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Timezone of a user id.
    Timezone,
    /// Alias of a user id.
    Alias,
    /// User id holding an alias.
    UserFromAlias,
    /// Timezone of the user holding an alias.
    TimezoneFromAlias,
}

impl RequestKind {
    /// Every registered kind, in registration order.
    pub const ALL: [Self; 4] = [
        Self::Timezone,
        Self::Alias,
        Self::UserFromAlias,
        Self::TimezoneFromAlias,
    ];

    /// Member name matched against the part after the dot.
    #[must_use]
    pub const fn member(self) -> &'static str {
        match self {
            Self::Timezone => "TIMEZONE_REQUEST",
            Self::Alias => "ALIAS_REQUEST",
            Self::UserFromAlias => "USER_FROM_ALIAS_REQUEST",
            Self::TimezoneFromAlias => "TIMEZONE_FROM_ALIAS_REQUEST",
        }
    }

    /// Full wire name, e.g. `RequestType.TIMEZONE_REQUEST`.
    #[must_use]
    pub fn qualified_name(self) -> String {
        format!("{REGISTRY_NAME}.{}", self.member())
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.member())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(RequestKind::Timezone, "RequestType.TIMEZONE_REQUEST")]
    #[case(RequestKind::Alias, "RequestType.ALIAS_REQUEST")]
    #[case(RequestKind::UserFromAlias, "RequestType.USER_FROM_ALIAS_REQUEST")]
    #[case(RequestKind::TimezoneFromAlias, "RequestType.TIMEZONE_FROM_ALIAS_REQUEST")]
    fn qualified_names(#[case] kind: RequestKind, #[case] expected: &str) {
        assert_eq!(kind.qualified_name(), expected);
        assert_eq!(kind.to_string(), kind.member());
    }
}
