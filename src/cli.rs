//! Command-line surface.

use crate::rooms::Network;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "presenced",
    version,
    about = "Logs presence updates observed in Raiden discovery rooms on Matrix federation servers"
)]
pub struct Args {
    /// Federation server base URL to monitor (repeatable)
    #[arg(short = 's', long = "server", value_name = "URL", required = true)]
    pub servers: Vec<String>,

    /// Blockchain network whose discovery room to watch (repeatable)
    #[arg(short = 'n', long = "network", value_name = "NAME", required = true)]
    pub networks: Vec<Network>,

    /// Seed string for deterministic signer derivation
    #[arg(short = 'p', long = "privkey-seed", value_name = "STRING")]
    pub privkey_seed: String,

    /// Append JSON-formatted logs to this file in addition to stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
