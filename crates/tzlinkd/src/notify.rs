//! Fan-out of failed requests to registered observers.
//!
//! Observers are registered once at start-up and owned by the dispatcher.
//! Each failed request spawns one detached task per observer, so a slow or
//! broken observer never holds up a response or another observer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use tzlink_protocol::OutcomeCode;

pub(crate) const NOTIFY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::notify");

/// Snapshot of a request that did not succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    /// `requestType` as received, when it was a string.
    pub request_type: Option<String>,
    /// `data` as received, when present.
    pub data: Option<Value>,
    /// Outcome sent to the client.
    pub code: OutcomeCode,
}

impl ErrorEvent {
    /// Event for a request that never got far enough to expose its fields.
    #[must_use]
    pub const fn opaque(code: OutcomeCode) -> Self {
        Self {
            request_type: None,
            data: None,
            code,
        }
    }
}

/// Errors an observer may report; they are logged and otherwise ignored.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NotifyError {
    message: String,
}

impl NotifyError {
    /// Builds an error from a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives a copy of every failed request.
#[async_trait]
pub trait ErrorObserver: Send + Sync {
    /// Name used in logs when the observer fails.
    fn name(&self) -> &str;

    /// Handles one event.
    async fn notify(&self, event: &ErrorEvent) -> Result<(), NotifyError>;
}

/// Ordered set of observers invoked for failed requests.
#[derive(Clone, Default)]
pub struct ErrorNotifier {
    observers: Vec<Arc<dyn ErrorObserver>>,
}

impl std::fmt::Debug for ErrorNotifier {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.observers.iter().map(|observer| observer.name()).collect();
        formatter
            .debug_struct("ErrorNotifier")
            .field("observers", &names)
            .finish()
    }
}

impl ErrorNotifier {
    /// Creates a notifier without observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer; invocation follows registration order.
    pub fn register(&mut self, observer: Arc<dyn ErrorObserver>) {
        self.observers.push(observer);
    }

    /// Builder-style variant of [`Self::register`].
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.register(observer);
        self
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Hands `event` to every observer on its own task and returns at once.
    ///
    /// The returned handles complete after the observer finishes and its
    /// failure, if any, has been logged. Dropping them detaches the tasks.
    /// Must be called from within a Tokio runtime.
    pub fn notify(&self, event: ErrorEvent) -> Vec<JoinHandle<()>> {
        if self.observers.is_empty() {
            return Vec::new();
        }
        let event = Arc::new(event);
        self.observers
            .iter()
            .map(|observer| {
                let observer = Arc::clone(observer);
                let event = Arc::clone(&event);
                tokio::spawn(supervise(observer, event))
            })
            .collect()
    }
}

async fn supervise(observer: Arc<dyn ErrorObserver>, event: Arc<ErrorEvent>) {
    let name = observer.name().to_owned();
    let outcome = tokio::spawn(async move { observer.notify(&event).await }).await;
    match outcome {
        Ok(Ok(())) => {
            debug!(target: NOTIFY_TARGET, observer = %name, "observer notified");
        }
        Ok(Err(error)) => {
            warn!(target: NOTIFY_TARGET, observer = %name, %error, "error observer failed");
        }
        Err(join_error) => {
            warn!(
                target: NOTIFY_TARGET,
                observer = %name,
                panicked = join_error.is_panic(),
                "error observer aborted"
            );
        }
    }
}

/// Observer that records failed requests as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[async_trait]
impl ErrorObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn notify(&self, event: &ErrorEvent) -> Result<(), NotifyError> {
        warn!(
            target: NOTIFY_TARGET,
            request_type = event.request_type.as_deref().unwrap_or("<none>"),
            data = ?event.data,
            code = event.code.code(),
            "request failed"
        );
        Ok(())
    }
}
