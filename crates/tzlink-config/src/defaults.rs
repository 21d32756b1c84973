use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Default TCP port for the lookup daemon.
pub const DEFAULT_PORT: u16 = 8720;

/// Default bind host; the daemon listens on every interface.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Largest message read from a connection in one go.
///
/// Anything past this many bytes is dropped unread.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4096;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint the daemon binds when nothing else is configured.
#[must_use]
pub fn default_listen_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_PORT)
}

/// Default bounded read size.
#[must_use]
pub const fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}
