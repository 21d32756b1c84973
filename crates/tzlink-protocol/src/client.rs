//! Blocking one-shot client.
//!
//! Each exchange opens a connection, writes one envelope, half-closes the
//! write side and reads until the daemon closes the connection.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

use crate::cipher::SharedKey;
use crate::message::{self, ProtocolError, RequestMessage, ResponseMessage};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised by [`Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// No connection could be opened to the daemon.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Address that was dialled.
        address: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Reading or writing the connection failed.
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
    /// The daemon closed the connection without replying.
    #[error("daemon closed the connection without a response")]
    EmptyResponse,
    /// The request or response could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Connection settings for talking to the daemon.
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
    key: SharedKey,
    timeout: Duration,
}

impl Client {
    /// Creates a client for `host:port` using `key`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, key: SharedKey) -> Self {
        Self {
            host: host.into(),
            port,
            key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the connect, read and write timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends `request` and waits for the daemon's response.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the connection fails or the response
    /// cannot be decoded with the shared key.
    pub fn send(&self, request: &RequestMessage) -> Result<ResponseMessage, ClientError> {
        let envelope = message::encode_request(request, &self.key)?;
        let reply = self.exchange(&envelope)?;
        if reply.is_empty() {
            return Err(ClientError::EmptyResponse);
        }
        Ok(message::decode_response(&reply, &self.key)?)
    }

    /// Writes raw bytes and returns whatever the daemon sends back.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when connecting, writing or reading fails.
    pub fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut stream = self.connect()?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(payload)?;
        stream.flush()?;
        // The daemon only reads once, so a peer that already hung up is fine.
        if let Err(error) = stream.shutdown(Shutdown::Write)
            && error.kind() != io::ErrorKind::NotConnected
        {
            return Err(error.into());
        }
        let mut reply = Vec::new();
        stream.read_to_end(&mut reply)?;
        Ok(reply)
    }

    fn connect(&self) -> Result<TcpStream, ClientError> {
        let address = format!("{}:{}", self.host, self.port);
        let connect_error = |source| ClientError::Connect {
            address: address.clone(),
            source,
        };
        let mut last_error = None;
        for candidate in (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(connect_error)?
        {
            match TcpStream::connect_timeout(&candidate, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(error) => last_error = Some(error),
            }
        }
        Err(connect_error(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
        })))
    }
}
