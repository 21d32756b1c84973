//! Test helpers for the transport module.

use std::net::SocketAddr;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

#[async_trait]
impl ConnectionHandler for CountingHandler {
    async fn handle(&self, _stream: TcpStream, _peer: SocketAddr) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
