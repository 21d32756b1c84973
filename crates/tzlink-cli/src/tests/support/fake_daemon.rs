//! One-shot fake daemon for CLI tests.
//!
//! Accepts a single connection, decrypts and records the request, then answers
//! with a canned response encrypted under the shared test key.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use anyhow::{Context, Result, anyhow};
use tzlink_protocol::{RequestMessage, ResponseMessage, SharedKey, decrypt, encode_response};

pub(in crate::tests) struct FakeDaemon {
    port: u16,
    handle: Option<thread::JoinHandle<Result<RequestMessage>>>,
}

impl FakeDaemon {
    /// Spawns a daemon on an ephemeral loopback port that answers once.
    pub(in crate::tests) fn spawn(key: SharedKey, response: ResponseMessage) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake daemon")?;
        let port = listener.local_addr().context("local addr")?.port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().context("accept client")?;
            let mut envelope = Vec::new();
            stream
                .read_to_end(&mut envelope)
                .context("read request envelope")?;
            let text = decrypt(&envelope, &key).context("decrypt request")?;
            let request: RequestMessage =
                serde_json::from_str(&text).context("parse request")?;
            let reply = encode_response(&response, &key).context("encode response")?;
            stream.write_all(&reply).context("write response")?;
            Ok(request)
        });
        Ok(Self {
            port,
            handle: Some(handle),
        })
    }

    pub(in crate::tests) const fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the exchange to finish and returns the decoded request.
    pub(in crate::tests) fn take_request(&mut self) -> Result<RequestMessage> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("request already taken"))?;
        handle
            .join()
            .map_err(|_| anyhow!("fake daemon thread panicked"))?
    }
}
