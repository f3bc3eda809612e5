//! Logging initialization.
//!
//! Default sink is human-readable stderr. With `--log-file`, JSON-encoded
//! records are additionally appended to the given file; the daemon never
//! truncates it, rotation is left to the operator.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,presenced=debug"));
    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(true);
    let registry = tracing_subscriber::registry().with(filter).with(stderr_layer);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry.with(fmt::layer().json().with_writer(Arc::new(file))).init();
        }
        None => registry.init(),
    }
    Ok(())
}
