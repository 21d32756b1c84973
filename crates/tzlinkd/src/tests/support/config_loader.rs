//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};

use tzlink_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Shared secret used by every test daemon.
pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Loader that binds an ephemeral loopback port.
#[derive(Debug, Clone)]
pub struct TestConfigLoader {
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config {
                listen: SocketEndpoint::tcp("127.0.0.1", 0),
                aes_key: TEST_SECRET.to_owned(),
                default_timezone: Some(String::from("Etc/UTC")),
                ..Config::default()
            },
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        self.config.aes_key = key.to_owned();
        self
    }

    #[must_use]
    pub fn with_default_timezone(mut self, zone: &str) -> Self {
        self.config.default_timezone = Some(zone.to_owned());
        self
    }

    #[must_use]
    pub fn with_records(mut self, path: Utf8PathBuf) -> Self {
        self.config.records_path = Some(path);
        self
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that intentionally fails by passing an unsupported endpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("tzlinkd"),
            OsString::from("--listen"),
            OsString::from("udp://127.0.0.1:9"),
        ];
        Config::load_from_iter(args)
    }
}
