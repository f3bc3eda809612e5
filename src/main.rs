//! presenced - presence monitoring daemon for Raiden discovery rooms.
//!
//! Connects to one or more Matrix federation servers, joins the discovery
//! room of each configured network, and logs every observed presence
//! update until a termination signal arrives.

mod cli;
mod client;
mod error;
mod monitor;
mod rooms;
mod shutdown;
mod signer;
mod telemetry;

use crate::client::matrix::MatrixFactory;
use crate::signer::LocalSigner;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    telemetry::init(args.log_file.as_deref())?;

    let shutdown = CancellationToken::new();
    shutdown::install_signal_handlers(&shutdown)?;

    let signer = Arc::new(LocalSigner::from_seed(&args.privkey_seed));
    info!(address = %signer.address_hex(), "Using address");

    let factory = Arc::new(MatrixFactory::new()?);
    monitor::run_monitors(factory, args.servers, signer, args.networks, shutdown).await;

    Ok(())
}
