//! Read contract for timezone records and the bundled in-memory store.
//!
//! The daemon never writes records. It reads them through [`TimezoneStore`],
//! so any backend that can answer the four lookups can sit behind the
//! protocol server.

mod errors;
mod memory;
mod zone;

use async_trait::async_trait;

pub use errors::StoreError;
pub use memory::{MemoryStore, TimezoneRecord};
pub use zone::{FALLBACK_TIMEZONE, resolve_default_timezone, system_default_timezone, zone_from_target};

/// Lookups the protocol server needs from the record store.
///
/// `Ok(None)` means no record (or an empty value); `Err` means the store
/// could not answer.
#[async_trait]
pub trait TimezoneStore: Send + Sync {
    /// Stored timezone for `user_id`.
    async fn timezone(&self, user_id: u64) -> Result<Option<String>, StoreError>;

    /// Stored alias for `user_id`.
    async fn alias(&self, user_id: u64) -> Result<Option<String>, StoreError>;

    /// User id holding `alias`.
    async fn user_by_alias(&self, alias: &str) -> Result<Option<u64>, StoreError>;

    /// Timezone of the user holding `alias`.
    async fn timezone_by_alias(&self, alias: &str) -> Result<Option<String>, StoreError>;
}
