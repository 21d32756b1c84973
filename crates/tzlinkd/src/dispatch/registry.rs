//! Name to constructor table for request types.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use tzlink_protocol::RequestKind;

use super::errors::DispatchError;
use super::query::Query;
use super::request::IncomingRequest;

type Constructor = fn(&Value) -> Result<Query, DispatchError>;

/// A registered request kind and the constructor that validates its data.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    kind: RequestKind,
    construct: Constructor,
}

impl RegistryEntry {
    /// Registered kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Validates `data` into a query.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidField`] when validation fails.
    pub fn construct(&self, data: &Value) -> Result<Query, DispatchError> {
        (self.construct)(data)
    }
}

const ENTRIES: [RegistryEntry; 4] = [
    RegistryEntry {
        kind: RequestKind::Timezone,
        construct: Query::timezone,
    },
    RegistryEntry {
        kind: RequestKind::Alias,
        construct: Query::alias,
    },
    RegistryEntry {
        kind: RequestKind::UserFromAlias,
        construct: Query::user_from_alias,
    },
    RegistryEntry {
        kind: RequestKind::TimezoneFromAlias,
        construct: Query::timezone_from_alias,
    },
];

static GLOBAL: Lazy<RequestRegistry> = Lazy::new(RequestRegistry::new);

/// Lookup table from member name to [`RegistryEntry`].
#[derive(Debug)]
pub struct RequestRegistry {
    entries: HashMap<&'static str, RegistryEntry>,
}

impl RequestRegistry {
    /// Builds the table of every known request kind.
    #[must_use]
    pub fn new() -> Self {
        let entries = ENTRIES
            .into_iter()
            .map(|entry| (entry.kind.member(), entry))
            .collect();
        Self { entries }
    }

    /// Process-wide table, built on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Finds the entry registered under `member`. Matching is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnresolvedType`] when nothing is registered.
    pub fn resolve(&self, member: &str) -> Result<&RegistryEntry, DispatchError> {
        self.entries
            .get(member)
            .ok_or_else(|| DispatchError::unresolved(format!("unknown request type '{member}'")))
    }

    /// Resolves the request's type and validates its data.
    pub(crate) fn build(&self, request: &IncomingRequest) -> Result<Query, DispatchError> {
        let entry = self.resolve(request.member()?)?;
        let data = request.data()?;
        entry.construct(data)
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
