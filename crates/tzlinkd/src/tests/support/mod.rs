//! Shared doubles for the daemon behaviour suites.

mod config_loader;
mod observer;
mod reporter;

pub use config_loader::{FailingConfigLoader, TEST_SECRET, TestConfigLoader};
pub use observer::RecordingObserver;
pub use reporter::{HealthEvent, RecordingHealthReporter};

/// Removes one pair of surrounding double quotes from a step argument.
pub fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}
