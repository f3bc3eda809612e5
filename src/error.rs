//! Error types for the monitoring layer.

use crate::client::ClientError;
use thiserror::Error;

/// Failures that terminate a single per-server monitor task.
///
/// A failed monitor never takes its siblings down; the supervisor logs the
/// error and keeps the remaining monitors running.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid server url: {0}")]
    InvalidServerUrl(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}
