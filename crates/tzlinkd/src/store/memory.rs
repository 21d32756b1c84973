//! In-memory record store, optionally seeded from a JSON file.

use std::collections::HashMap;
use std::fs;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{StoreError, TimezoneStore};

const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::store");

/// One user's entry in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimezoneRecord {
    /// Chat platform user id.
    pub user_id: u64,
    /// IANA zone name, e.g. `Europe/Berlin`.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Alias unique across users.
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Default)]
struct Entry {
    timezone: Option<String>,
    alias: Option<String>,
}

#[derive(Debug, Default)]
struct Records {
    users: HashMap<u64, Entry>,
    aliases: HashMap<String, u64>,
}

/// Record store held in process memory.
///
/// Writes keep the alias index consistent: an alias maps to at most one user
/// and a user holds at most one alias.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from seed records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AliasTaken`] when two records claim one alias.
    pub fn from_records(records: impl IntoIterator<Item = TimezoneRecord>) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            if let Some(timezone) = record.timezone.as_deref() {
                store.set_timezone(record.user_id, timezone)?;
            }
            if let Some(alias) = record.alias.as_deref() {
                store.set_alias(record.user_id, alias)?;
            }
        }
        Ok(store)
    }

    /// Loads seed records from a JSON array on disk.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the file cannot be read or parsed, or if
    /// it assigns one alias to two users.
    pub fn load(path: &Utf8Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_owned(),
            source,
        })?;
        let records: Vec<TimezoneRecord> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.to_owned(),
                source,
            })?;
        let count = records.len();
        let store = Self::from_records(records)?;
        info!(target: STORE_TARGET, path = %path, records = count, "loaded timezone records");
        Ok(store)
    }

    /// Stores `timezone` for `user_id`, replacing spaces with underscores.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn set_timezone(&self, user_id: u64, timezone: &str) -> Result<(), StoreError> {
        let mut records = self.write()?;
        records.users.entry(user_id).or_default().timezone = Some(timezone.replace(' ', "_"));
        Ok(())
    }

    /// Assigns `alias` to `user_id`, releasing the user's previous alias.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AliasTaken`] if another user holds the alias.
    pub fn set_alias(&self, user_id: u64, alias: &str) -> Result<(), StoreError> {
        let mut records = self.write()?;
        if let Some(&owner) = records.aliases.get(alias)
            && owner != user_id
        {
            return Err(StoreError::AliasTaken {
                alias: alias.to_owned(),
                owner,
            });
        }
        let entry = records.users.entry(user_id).or_default();
        let previous = entry.alias.replace(alias.to_owned());
        if let Some(previous) = previous {
            records.aliases.remove(&previous);
        }
        records.aliases.insert(alias.to_owned(), user_id);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>, StoreError> {
        self.records.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>, StoreError> {
        self.records.write().map_err(|_| StoreError::Poisoned)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|text| !text.is_empty()).cloned()
}

#[async_trait]
impl TimezoneStore for MemoryStore {
    async fn timezone(&self, user_id: u64) -> Result<Option<String>, StoreError> {
        let records = self.read()?;
        Ok(non_empty(
            records
                .users
                .get(&user_id)
                .and_then(|entry| entry.timezone.as_ref()),
        ))
    }

    async fn alias(&self, user_id: u64) -> Result<Option<String>, StoreError> {
        let records = self.read()?;
        Ok(non_empty(
            records
                .users
                .get(&user_id)
                .and_then(|entry| entry.alias.as_ref()),
        ))
    }

    async fn user_by_alias(&self, alias: &str) -> Result<Option<u64>, StoreError> {
        let records = self.read()?;
        Ok(records.aliases.get(alias).copied())
    }

    async fn timezone_by_alias(&self, alias: &str) -> Result<Option<String>, StoreError> {
        let records = self.read()?;
        Ok(non_empty(
            records
                .aliases
                .get(alias)
                .and_then(|user_id| records.users.get(user_id))
                .and_then(|entry| entry.timezone.as_ref()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::from_records([
            TimezoneRecord {
                user_id: 42,
                timezone: Some(String::from("Europe/Berlin")),
                alias: Some(String::from("bob")),
            },
            TimezoneRecord {
                user_id: 7,
                timezone: None,
                alias: Some(String::from("drifter")),
            },
        ])
        .expect("seed store")
    }

    #[rstest]
    #[tokio::test]
    async fn answers_every_lookup(store: MemoryStore) {
        assert_eq!(store.timezone(42).await.expect("lookup"), Some(String::from("Europe/Berlin")));
        assert_eq!(store.alias(42).await.expect("lookup"), Some(String::from("bob")));
        assert_eq!(store.user_by_alias("bob").await.expect("lookup"), Some(42));
        assert_eq!(
            store.timezone_by_alias("bob").await.expect("lookup"),
            Some(String::from("Europe/Berlin"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_values_are_absent(store: MemoryStore) {
        assert_eq!(store.timezone(7).await.expect("lookup"), None);
        assert_eq!(store.timezone_by_alias("drifter").await.expect("lookup"), None);
        assert_eq!(store.alias(999).await.expect("lookup"), None);
        assert_eq!(store.user_by_alias("ghost").await.expect("lookup"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn alias_lookup_is_case_sensitive(store: MemoryStore) {
        assert_eq!(store.user_by_alias("Bob").await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn empty_values_count_as_absent() {
        let store = MemoryStore::new();
        store.set_timezone(1, "").expect("write");
        assert_eq!(store.timezone(1).await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn spaces_in_zone_names_become_underscores() {
        let store = MemoryStore::new();
        store.set_timezone(5, "America/New York").expect("write");
        assert_eq!(
            store.timezone(5).await.expect("lookup"),
            Some(String::from("America/New_York"))
        );
    }

    #[rstest]
    fn alias_cannot_be_shared(store: MemoryStore) {
        let error = store.set_alias(7, "bob").expect_err("alias already taken");
        assert!(matches!(error, StoreError::AliasTaken { owner: 42, .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_releases_the_old_alias(store: MemoryStore) {
        store.set_alias(42, "robert").expect("rename");
        assert_eq!(store.user_by_alias("bob").await.expect("lookup"), None);
        assert_eq!(store.user_by_alias("robert").await.expect("lookup"), Some(42));
        store.set_alias(7, "bob").expect("released alias is free");
    }

    #[tokio::test]
    async fn loads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"user_id": 3, "timezone": "Asia/Tokyo", "alias": "kei"}}, {{"user_id": 4}}]"#
        )
        .expect("write seed");
        let path = Utf8Path::from_path(file.path()).expect("utf8 path");
        let store = MemoryStore::load(path).expect("load seed");
        assert_eq!(
            store.timezone_by_alias("kei").await.expect("lookup"),
            Some(String::from("Asia/Tokyo"))
        );
        assert_eq!(store.timezone(4).await.expect("lookup"), None);
    }

    #[test]
    fn malformed_seed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{not json").expect("write seed");
        let path = Utf8Path::from_path(file.path()).expect("utf8 path");
        let error = MemoryStore::load(path).expect_err("parse failure");
        assert!(matches!(error, StoreError::Parse { .. }));
    }

    #[test]
    fn duplicate_aliases_in_seed_are_rejected() {
        let result = MemoryStore::from_records([
            TimezoneRecord {
                user_id: 1,
                timezone: None,
                alias: Some(String::from("twin")),
            },
            TimezoneRecord {
                user_id: 2,
                timezone: None,
                alias: Some(String::from("twin")),
            },
        ]);
        assert!(matches!(result, Err(StoreError::AliasTaken { .. })));
    }
}
