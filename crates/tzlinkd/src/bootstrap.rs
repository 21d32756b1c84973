//! Daemon bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use tzlink_config::Config;
use tzlink_protocol::{CipherError, IV_LEN, SharedKey};

use crate::dispatch::{DispatchConnectionHandler, DispatchContext};
use crate::health::HealthReporter;
use crate::notify::{ErrorNotifier, ErrorObserver, TracingObserver};
use crate::store::{MemoryStore, StoreError, TimezoneStore, resolve_default_timezone};
use crate::telemetry::{self, TelemetryError};

/// Smallest read buffer that can hold an IV and one cipher block.
pub const MIN_MESSAGE_BYTES: usize = 2 * IV_LEN;

/// Largest read buffer a connection may allocate.
pub const MAX_MESSAGE_BYTES: usize = 1 << 20;

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when no valid configuration can be built.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads defaults, files, environment and arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that always yields the same configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configured AES key is unusable.
    #[error("invalid aes_key: {source}")]
    Key {
        /// Underlying key error.
        #[source]
        source: CipherError,
    },
    /// The record store could not be opened.
    #[error("failed to open record store: {source}")]
    Store {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
    /// The read buffer is too small for any envelope or too large to allocate
    /// per connection.
    #[error(
        "max_message_bytes must be between {MIN_MESSAGE_BYTES} and {MAX_MESSAGE_BYTES}, got {configured}"
    )]
    MessageLimit {
        /// Configured limit.
        configured: usize,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    key: SharedKey,
    store: Arc<dyn TimezoneStore>,
    default_timezone: String,
    notifier: ErrorNotifier,
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Daemon")
            .field("config", &self.config.listen())
            .field("key", &self.key)
            .field("default_timezone", &self.default_timezone)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Zone reported for users without a stored one.
    #[must_use]
    pub fn default_timezone(&self) -> &str {
        &self.default_timezone
    }

    /// Observers notified about failed requests.
    #[must_use]
    pub const fn notifier(&self) -> &ErrorNotifier {
        &self.notifier
    }

    /// Adds an observer for failed requests.
    pub fn register_observer(&mut self, observer: Arc<dyn ErrorObserver>) {
        self.notifier.register(observer);
    }

    /// Builds the connection handler served by the listener.
    #[must_use]
    pub fn connection_handler(&self) -> DispatchConnectionHandler {
        DispatchConnectionHandler::new(DispatchContext {
            key: self.key.clone(),
            store: Arc::clone(&self.store),
            default_timezone: self.default_timezone.clone(),
            notifier: self.notifier.clone(),
            max_message_bytes: self.config.max_message_bytes(),
        })
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] for the first step that fails; the reporter
/// sees the same error.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match assemble(loader) {
        Ok(daemon) => {
            reporter.bootstrap_succeeded(daemon.config());
            Ok(daemon)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn assemble(loader: &dyn ConfigLoader) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;

    if !(MIN_MESSAGE_BYTES..=MAX_MESSAGE_BYTES).contains(&config.max_message_bytes()) {
        return Err(BootstrapError::MessageLimit {
            configured: config.max_message_bytes(),
        });
    }
    let key = SharedKey::from_passphrase(config.aes_key())
        .map_err(|source| BootstrapError::Key { source })?;
    let store = open_store(&config).map_err(|source| BootstrapError::Store { source })?;
    let default_timezone = resolve_default_timezone(config.default_timezone());
    let notifier = ErrorNotifier::new().with_observer(Arc::new(TracingObserver));

    Ok(Daemon {
        config,
        key,
        store,
        default_timezone,
        notifier,
    })
}

fn open_store(config: &Config) -> Result<Arc<dyn TimezoneStore>, StoreError> {
    let store = match config.records_path() {
        Some(path) => MemoryStore::load(path)?,
        None => MemoryStore::new(),
    };
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use tzlink_config::SocketEndpoint;
    use tzlink_protocol::{
        OutcomeCode, RequestKind, RequestMessage, ResponseMessage, decode_response,
        encode_request,
    };

    use super::*;
    use crate::health::StructuredHealthReporter;
    use crate::tests::support::{RecordingObserver, TEST_SECRET};

    fn config_with_limit(max_message_bytes: usize) -> Config {
        Config {
            listen: SocketEndpoint::tcp("127.0.0.1", 0),
            aes_key: TEST_SECRET.to_owned(),
            default_timezone: Some(String::from("Etc/UTC")),
            max_message_bytes,
            ..Config::default()
        }
    }

    fn bootstrap(config: Config) -> Result<Daemon, BootstrapError> {
        bootstrap_with(
            &StaticConfigLoader::new(config),
            Arc::new(StructuredHealthReporter::new()),
        )
    }

    #[rstest]
    #[case(0)]
    #[case(MIN_MESSAGE_BYTES - 1)]
    #[case(MAX_MESSAGE_BYTES + 1)]
    #[case(usize::MAX)]
    fn message_limits_outside_the_bounds_are_rejected(#[case] limit: usize) {
        let error = bootstrap(config_with_limit(limit)).expect_err("limit should be rejected");
        assert!(
            matches!(error, BootstrapError::MessageLimit { configured } if configured == limit),
            "unexpected error: {error}"
        );
    }

    #[rstest]
    #[case(MIN_MESSAGE_BYTES)]
    #[case(MAX_MESSAGE_BYTES)]
    fn message_limits_at_the_bounds_are_accepted(#[case] limit: usize) {
        let daemon = bootstrap(config_with_limit(limit)).expect("bootstrap succeeds");
        assert_eq!(daemon.config().max_message_bytes(), limit);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn registered_observers_see_failed_requests() {
        let mut daemon = bootstrap(config_with_limit(4096)).expect("bootstrap succeeds");
        let observer = Arc::new(RecordingObserver::default());
        daemon.register_observer(observer.clone());
        assert_eq!(daemon.notifier().len(), 2);

        let key = SharedKey::from_passphrase(TEST_SECRET).expect("valid key");
        let request = RequestMessage::for_user(RequestKind::Alias, 77);
        let envelope = encode_request(&request, &key).expect("encode");
        let (mut client, server) = duplex(8192);
        client.write_all(&envelope).await.expect("write request");
        client.shutdown().await.expect("close request side");
        daemon.connection_handler().dispatch(server, None).await;
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.expect("read reply");

        assert_eq!(
            decode_response(&reply, &key).expect("decode reply"),
            ResponseMessage::failure(OutcomeCode::NotFound)
        );
        let events = tokio::task::spawn_blocking(move || observer.wait_for(1))
            .await
            .expect("wait for events");
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().map(|event| event.code), Some(OutcomeCode::NotFound));
    }
}
