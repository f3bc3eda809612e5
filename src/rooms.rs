//! Discovery room naming.
//!
//! Broadcast discovery rooms are namespaced per blockchain network with a
//! fixed alias format that existing deployments depend on. The format must
//! stay byte-for-byte stable: `#raiden_<chain_id>_discovery:<server_host>`.

use crate::error::MonitorError;
use clap::ValueEnum;
use std::fmt;

/// Base name of the per-network discovery room.
pub const DISCOVERY_DEFAULT_ROOM: &str = "discovery";

/// Prefix shared by all room aliases.
const ROOM_ALIAS_PREFIX: &str = "raiden";

/// Blockchain networks with a known discovery room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Mainnet,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
}

impl Network {
    /// Numeric chain id used to namespace discovery rooms.
    pub fn chain_id(self) -> u32 {
        match self {
            Network::Mainnet => 1,
            Network::Ropsten => 3,
            Network::Rinkeby => 4,
            Network::Goerli => 5,
            Network::Kovan => 42,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Ropsten => "ropsten",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::Kovan => "kovan",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the bare room alias (no leading `#`, no server suffix).
pub fn make_room_alias(chain_id: u32, suffix: &str) -> String {
    format!("{ROOM_ALIAS_PREFIX}_{chain_id}_{suffix}")
}

/// Full address of the discovery room for `network` on `server_host`.
pub fn discovery_room_address(network: Network, server_host: &str) -> String {
    let alias = make_room_alias(network.chain_id(), DISCOVERY_DEFAULT_ROOM);
    format!("#{alias}:{server_host}")
}

/// Host-identifying component of a server URL (host plus explicit port),
/// used as the room alias suffix and as the per-server log label.
pub fn server_host(server_url: &str) -> Result<String, MonitorError> {
    let url = reqwest::Url::parse(server_url)
        .map_err(|_| MonitorError::InvalidServerUrl(server_url.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| MonitorError::InvalidServerUrl(server_url.to_string()))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
