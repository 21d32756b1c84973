//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
}

/// Runs the daemon using the production collaborators.
///
/// Serves until SIGINT or SIGTERM arrives.
///
/// # Errors
///
/// Returns a [`LaunchError`] if bootstrap, binding or signal handling fails.
pub async fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::new(),
    };
    run_daemon_with(plan).await
}

/// Runs the daemon with injected collaborators.
pub(crate) async fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
    } = plan;

    let daemon = bootstrap_with(&loader, Arc::clone(&reporter))?;
    let listener = SocketListener::bind(daemon.config().listen())?;
    let address = listener.local_addr();
    let handler = Arc::new(daemon.connection_handler());
    let listener_handle = listener.start(handler)?;
    if let Some(address) = address {
        reporter.listener_ready(address);
    }
    info!(
        target: PROCESS_TARGET,
        default_timezone = daemon.default_timezone(),
        observers = daemon.notifier().len(),
        "serving without admission control; every connection gets its own task"
    );

    let waited = shutdown.wait().await;
    reporter.shutdown_requested();
    listener_handle.shutdown();
    listener_handle.join().await?;
    waited?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed; in-flight connections were not drained"
    );
    Ok(())
}
