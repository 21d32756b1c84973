//! Shared configuration for the tzlink daemon and CLI.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! (`--config-path` or `TZLINK_CONFIG_PATH`), then `TZLINK_*` environment
//! variables, then command-line flags. The daemon loads the result once at
//! start-up and hands an immutable copy to every component.

mod defaults;
mod logging;
mod socket;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_PORT,
    default_listen_endpoint, default_log_filter, default_log_filter_string, default_log_format,
    default_max_message_bytes,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError};

/// Resolved configuration for the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TZLINK")]
pub struct Config {
    /// Endpoint the daemon binds and the CLI dials.
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: SocketEndpoint,
    /// Shared AES secret; its UTF-8 bytes must be 16, 24 or 32 long.
    #[ortho_config(default = String::new())]
    pub aes_key: String,
    /// Upper bound for a single request read.
    #[ortho_config(default = default_max_message_bytes())]
    pub max_message_bytes: usize,
    /// Timezone reported for users without a stored zone.
    ///
    /// Falls back to the host zone when unset.
    pub default_timezone: Option<String>,
    /// JSON file seeding the in-memory record store.
    pub records_path: Option<Utf8PathBuf>,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            aes_key: String::new(),
            max_message_bytes: default_max_message_bytes(),
            default_timezone: None,
            records_path: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the daemon listens on.
    #[must_use]
    pub const fn listen(&self) -> &SocketEndpoint {
        &self.listen
    }

    /// Configured shared secret, verbatim.
    #[must_use]
    pub fn aes_key(&self) -> &str {
        &self.aes_key
    }

    /// Bounded read size for one request.
    #[must_use]
    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    /// Explicit default timezone override, if any.
    #[must_use]
    pub fn default_timezone(&self) -> Option<&str> {
        self.default_timezone
            .as_deref()
            .map(str::trim)
            .filter(|zone| !zone.is_empty())
    }

    /// Seed file for the record store, if any.
    #[must_use]
    pub fn records_path(&self) -> Option<&camino::Utf8Path> {
        self.records_path.as_deref()
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
