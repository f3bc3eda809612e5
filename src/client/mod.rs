//! Client session seam.
//!
//! The monitoring layer never speaks the federation protocol itself; it
//! drives sessions through the [`SessionFactory`] / [`ClientSession`]
//! traits. The production adapter lives in [`matrix`]; tests substitute
//! recording doubles.
//!
//! Presence delivery is channel-based: the adapter pushes every observed
//! update onto a per-session channel in arrival order, and the monitor
//! task drains it. Per-server ordering is the channel's FIFO order.

pub mod matrix;

use crate::signer::LocalSigner;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors surfaced by a client session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("login rejected by {server}: {reason}")]
    Login { server: String, reason: String },

    #[error("failed to join {alias}: {reason}")]
    JoinRoom { alias: String, reason: String },

    #[error("session is not logged in")]
    NotLoggedIn,

    #[error("presence channel already taken")]
    PresenceChannelTaken,
}

/// Per-user presence state published by the federation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPresence {
    Online,
    Offline,
    Unavailable,
    /// Wire value outside the known set.
    Unknown,
}

impl UserPresence {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "online" => UserPresence::Online,
            "offline" => UserPresence::Offline,
            "unavailable" => UserPresence::Unavailable,
            _ => UserPresence::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserPresence::Online => "online",
            UserPresence::Offline => "offline",
            UserPresence::Unavailable => "unavailable",
            UserPresence::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UserPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed presence update.
///
/// `update_id` is a per-session monotonic counter assigned in delivery
/// order; it restarts at zero with each new session.
#[derive(Debug, Clone)]
pub struct PresenceEvent {
    pub user_id: String,
    pub presence: UserPresence,
    pub update_id: u64,
}

/// Creates sessions bound to individual servers.
///
/// One factory is shared process-wide; each server target gets exactly one
/// session for the lifetime of its monitor task.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: ClientSession;

    /// Establish a session object bound to one server, not yet
    /// authenticated.
    async fn create_client(&self, server_url: &str) -> Result<Self::Session, ClientError>;
}

/// A live connection to one federation server.
#[async_trait]
pub trait ClientSession: Send + 'static {
    /// Authenticate using the signer's key material.
    async fn login(&mut self, signer: &LocalSigner) -> Result<(), ClientError>;

    /// Take the presence channel. May be taken at most once per session.
    fn presence_events(&mut self) -> Result<mpsc::UnboundedReceiver<PresenceEvent>, ClientError>;

    /// Begin background retrieval of server events feeding the presence
    /// channel and any joined rooms.
    async fn start_listener(
        &mut self,
        poll_timeout: Duration,
        poll_delay: Duration,
    ) -> Result<(), ClientError>;

    /// Join a named broadcast room. Idempotent: re-joining an
    /// already-joined room is success.
    async fn join_broadcast_room(&self, room_address: &str) -> Result<(), ClientError>;

    /// Terminate the background listener and release the connection.
    /// Infallible and idempotent; shutdown-time errors are benign no-ops.
    async fn stop(&mut self);
}
