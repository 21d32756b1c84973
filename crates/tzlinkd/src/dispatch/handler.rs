//! Connection handler that answers one encrypted request per connection.
//!
//! Stages run in order inside the connection's task: read one bounded
//! envelope, decrypt, parse, resolve the request type, run the query, then
//! write the response. Every path ends with exactly one response; failures
//! are additionally handed to the error notifier.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use tzlink_protocol::{ResponseMessage, SharedKey, cipher};

use crate::bootstrap::MAX_MESSAGE_BYTES;
use crate::notify::{ErrorEvent, ErrorNotifier};
use crate::store::TimezoneStore;
use crate::transport::ConnectionHandler;

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::registry::RequestRegistry;
use super::request::IncomingRequest;
use super::response::{ResponseWriter, response_for};

const DRAIN_TIMEOUT: Duration = Duration::from_millis(250);
const DRAIN_CHUNK: usize = 4096;

/// Collaborators shared by every connection.
#[derive(Clone)]
pub struct DispatchContext {
    /// Key for request and response envelopes.
    pub key: SharedKey,
    /// Record store queried by handlers.
    pub store: Arc<dyn TimezoneStore>,
    /// Zone reported for users without a stored one.
    pub default_timezone: String,
    /// Observers for failed requests.
    pub notifier: ErrorNotifier,
    /// Size of the single read buffer, capped at [`MAX_MESSAGE_BYTES`].
    pub max_message_bytes: usize,
}

/// Answers protocol requests arriving on accepted connections.
pub struct DispatchConnectionHandler {
    context: DispatchContext,
    registry: &'static RequestRegistry,
}

impl std::fmt::Debug for DispatchConnectionHandler {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DispatchConnectionHandler")
            .field("key", &self.context.key)
            .field("default_timezone", &self.context.default_timezone)
            .field("notifier", &self.context.notifier)
            .field("max_message_bytes", &self.context.max_message_bytes)
            .finish_non_exhaustive()
    }
}

impl DispatchConnectionHandler {
    /// Creates a handler using the process-wide request registry.
    #[must_use]
    pub fn new(context: DispatchContext) -> Self {
        Self {
            context,
            registry: RequestRegistry::global(),
        }
    }

    /// Serves one request on `stream` and closes it.
    pub async fn dispatch<S>(&self, mut stream: S, peer: Option<SocketAddr>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (result, event) = self.process(&mut stream).await;
        let response = response_for(&result);
        match &result {
            Ok(_) => debug!(target: DISPATCH_TARGET, ?peer, "request answered"),
            Err(error) => debug!(
                target: DISPATCH_TARGET,
                ?peer,
                %error,
                code = response.code.code(),
                "request rejected"
            ),
        }
        if let Some(event) = event {
            // Detached; observers finish on their own time.
            drop(self.context.notifier.notify(event));
        }
        self.respond(&mut stream, &response, peer).await;
        drain(&mut stream).await;
    }

    async fn process<S>(&self, stream: &mut S) -> (Result<String, DispatchError>, Option<ErrorEvent>)
    where
        S: AsyncRead + Unpin,
    {
        let request = match self.read_request(stream).await {
            Ok(request) => request,
            Err(error) => {
                let event = ErrorEvent::opaque(error.outcome());
                return (Err(error), Some(event));
            }
        };
        match self.answer(&request).await {
            Ok(message) => (Ok(message), None),
            Err(error) => {
                let event = request.error_event(error.outcome());
                (Err(error), Some(event))
            }
        }
    }

    async fn read_request<S>(&self, stream: &mut S) -> Result<IncomingRequest, DispatchError>
    where
        S: AsyncRead + Unpin,
    {
        let envelope = read_envelope(stream, self.context.max_message_bytes)
            .await
            .map_err(DispatchError::Read)?;
        let text = cipher::decrypt(&envelope, &self.context.key)?;
        IncomingRequest::parse(&text)
    }

    async fn answer(&self, request: &IncomingRequest) -> Result<String, DispatchError> {
        let query = self.registry.build(request)?;
        debug!(target: DISPATCH_TARGET, kind = %query.kind(), "dispatching query");
        let result = query
            .respond(self.context.store.as_ref(), &self.context.default_timezone)
            .await;
        if let Err(DispatchError::Store(error)) = &result {
            warn!(target: DISPATCH_TARGET, %error, "record store lookup failed");
        }
        result
    }

    async fn respond<S>(&self, stream: &mut S, response: &ResponseMessage, peer: Option<SocketAddr>)
    where
        S: AsyncWrite + Unpin,
    {
        let mut writer = ResponseWriter::new(stream, &self.context.key);
        if let Err(error) = writer.send(response).await {
            warn!(target: DISPATCH_TARGET, ?peer, %error, "failed to send response");
        }
    }
}

#[async_trait]
impl ConnectionHandler for DispatchConnectionHandler {
    async fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        self.dispatch(stream, Some(peer)).await;
    }
}

/// Performs the single bounded read; bytes past `limit` are ignored.
async fn read_envelope<S>(stream: &mut S, limit: usize) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0_u8; limit.min(MAX_MESSAGE_BYTES)];
    let read = loop {
        match stream.read(&mut buffer).await {
            Ok(read) => break read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    };
    buffer.truncate(read);
    Ok(buffer)
}

/// Discards unread input briefly so closing does not reset the connection
/// before the client has read its response.
async fn drain<S>(stream: &mut S)
where
    S: AsyncRead + Unpin,
{
    let mut sink = [0_u8; DRAIN_CHUNK];
    let discard = async {
        while let Ok(read) = stream.read(&mut sink).await {
            if read == 0 {
                break;
            }
        }
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, discard).await.is_err() {
        debug!(target: DISPATCH_TARGET, "client kept the connection open after the response");
    }
}
