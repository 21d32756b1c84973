//! Connection handling abstraction for the listener.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpStream;

/// Handles accepted connections.
#[async_trait]
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    async fn handle(&self, stream: TcpStream, peer: SocketAddr);
}
