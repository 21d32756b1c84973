//! Encrypted response writing.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use tzlink_protocol::{ProtocolError, ResponseMessage, SharedKey, encode_response};

use super::errors::DispatchError;

/// Errors raised while sending a response; the connection is abandoned.
#[derive(Debug, Error)]
pub(crate) enum WriteError {
    /// The response could not be encrypted.
    #[error("failed to encode response: {0}")]
    Encode(#[from] ProtocolError),
    /// The client went away.
    #[error("failed to write response: {0}")]
    Io(#[from] io::Error),
}

/// Maps a lookup result onto the response sent to the client.
pub(crate) fn response_for(result: &Result<String, DispatchError>) -> ResponseMessage {
    match result {
        Ok(message) => ResponseMessage::ok(message.clone()),
        Err(error) => ResponseMessage::failure(error.outcome()),
    }
}

/// Writes one encrypted response and closes the write half.
pub(crate) struct ResponseWriter<'a, W> {
    writer: W,
    key: &'a SharedKey,
}

impl<'a, W> ResponseWriter<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) const fn new(writer: W, key: &'a SharedKey) -> Self {
        Self { writer, key }
    }

    /// Encrypts, writes and flushes `response`, then shuts down writing.
    pub(crate) async fn send(&mut self, response: &ResponseMessage) -> Result<(), WriteError> {
        let envelope = encode_response(response, self.key)?;
        self.writer.write_all(&envelope).await?;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}
