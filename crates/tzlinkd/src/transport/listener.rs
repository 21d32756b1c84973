//! Listener implementation for the protocol endpoint.

use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tzlink_config::SocketEndpoint;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to the configured endpoint but not yet accepting.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: SocketEndpoint,
    listener: StdTcpListener,
}

impl SocketListener {
    /// Resolves and binds `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the host does not resolve or the
    /// address cannot be bound.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port())?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
        })
    }

    /// Address actually bound, useful when the configured port is `0`.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    /// Starts the accept loop on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] if the socket cannot be handed to the
    /// runtime.
    pub fn start(self, handler: Arc<dyn ConnectionHandler>) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let listener = TcpListener::from_std(self.listener)
            .map_err(|source| ListenerError::Register { source })?;
        let (shutdown, signal) = watch::channel(false);
        let task = tokio::spawn(run_accept_loop(listener, self.endpoint, signal, handler));
        Ok(ListenerHandle {
            shutdown,
            task: Some(task),
        })
    }
}

/// Handle to the running accept loop.
///
/// Dropping the handle also stops the loop.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop. In-flight connections keep running.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Waits for the accept loop to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::TaskPanic`] if the loop panicked.
    pub async fn join(mut self) -> Result<(), ListenerError> {
        match self.task.take() {
            Some(task) => task.await.map_err(|_| ListenerError::TaskPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

async fn run_accept_loop(
    listener: TcpListener,
    endpoint: SocketEndpoint,
    mut shutdown: watch::Receiver<bool>,
    handler: Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %endpoint,
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    last_error = None;
                    debug!(target: LISTENER_TARGET, %peer, "connection accepted");
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move { handler.handle(stream, peer).await });
                }
                Err(error) => {
                    let kind = error.kind();
                    if last_error != Some(kind) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "socket accept error"
                        );
                    }
                    last_error = Some(kind);
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            },
        }
    }
    info!(
        target: LISTENER_TARGET,
        endpoint = %endpoint,
        "socket listener stopped"
    );
}

fn bind_tcp(host: &str, port: u16) -> Result<StdTcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })?;
    StdTcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
