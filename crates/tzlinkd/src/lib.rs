//! The tzlink daemon.
//!
//! The daemon answers timezone and alias lookups for non-interactive clients
//! over a private TCP endpoint. Each connection carries one AES-CBC encrypted
//! JSON request and receives one encrypted response, after which the daemon
//! closes the connection.
//!
//! Start-up follows a fixed sequence: load configuration, install telemetry,
//! build the shared key, open the record store, resolve the default timezone
//! and register error observers. The listener then accepts connections until
//! a shutdown signal arrives.
//!
//! ## Known limitations
//!
//! - Each request is read with a single bounded read; bytes past
//!   `max_message_bytes` (at most [`MAX_MESSAGE_BYTES`]) are ignored and the
//!   request usually fails to decrypt.
//! - CBC without an authentication tag provides confidentiality only.
//! - There is no admission control, and shutdown does not drain in-flight
//!   connections.

mod bootstrap;
mod dispatch;
mod health;
pub mod notify;
mod process;
pub mod store;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, MAX_MESSAGE_BYTES, MIN_MESSAGE_BYTES,
    StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{
    DispatchConnectionHandler, DispatchContext, DispatchError, Query, RegistryEntry,
    RequestRegistry,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use notify::{ErrorEvent, ErrorNotifier, ErrorObserver, NotifyError, TracingObserver};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use store::{MemoryStore, StoreError, TimezoneRecord, TimezoneStore};
pub use telemetry::TelemetryError;
pub use transport::{ConnectionHandler, ListenerError, ListenerHandle, SocketListener};

#[cfg(test)]
mod tests;
