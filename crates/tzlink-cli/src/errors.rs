//! Error types for the CLI runtime.

use std::sync::Arc;

use thiserror::Error;

use tzlink_protocol::{CipherError, ClientError};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid aes_key: {0}")]
    Key(CipherError),
    #[error("lookup failed: {0}")]
    Exchange(ClientError),
}
