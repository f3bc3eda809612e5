//! Per-server presence monitors and their supervisor.
//!
//! One task per configured server runs the full session lifecycle:
//! authenticate, start the listener, join the discovery room of every
//! configured network, then drain presence updates until shutdown. A
//! dropped session is not re-established; the monitor simply waits for
//! shutdown once its event channel closes.

use crate::client::{ClientSession, PresenceEvent, SessionFactory};
use crate::error::MonitorError;
use crate::rooms::{self, Network};
use crate::signer::LocalSigner;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Long-poll timeout handed to the session listener.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Delay between listener polls.
pub const POLL_DELAY: Duration = Duration::from_millis(1_000);

/// Emit one structured record for an observed presence update.
pub fn log_presence(server: &str, event: &PresenceEvent) {
    info!(
        server = %server,
        user_id = %event.user_id,
        presence = %event.presence,
        update_id = event.update_id,
        "Presence update"
    );
}

/// Run the monitoring lifecycle for one server until `shutdown` fires.
///
/// Startup failures (unreachable server, rejected login, failed join) are
/// fatal to this task only and propagate to the supervisor.
pub async fn monitor_server_presence<F>(
    factory: Arc<F>,
    server: String,
    signer: Arc<LocalSigner>,
    networks: Vec<Network>,
    shutdown: CancellationToken,
) -> Result<(), MonitorError>
where
    F: SessionFactory,
{
    let server_host = rooms::server_host(&server)?;
    let mut session = factory.create_client(&server).await?;
    let result = drive_session(&mut session, &server, &server_host, &signer, &networks, &shutdown).await;
    // Stop on both paths: a failed startup must not leak the listener task.
    session.stop().await;
    result
}

async fn drive_session<S>(
    session: &mut S,
    server: &str,
    server_host: &str,
    signer: &LocalSigner,
    networks: &[Network],
    shutdown: &CancellationToken,
) -> Result<(), MonitorError>
where
    S: ClientSession,
{
    session.login(signer).await?;
    let mut events = session.presence_events()?;
    session.start_listener(POLL_TIMEOUT, POLL_DELAY).await?;
    for network in networks {
        let room_address = rooms::discovery_room_address(*network, server_host);
        session.join_broadcast_room(&room_address).await?;
        debug!(server = %server, room = %room_address, "Joined discovery room");
    }
    info!(server = %server, "Monitoring started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => log_presence(server, &event),
                None => {
                    // Listener ended; no reconnect, just await shutdown.
                    shutdown.cancelled().await;
                    break;
                }
            },
        }
    }

    Ok(())
}

/// Spawn one monitor per server and block until shutdown, then wait for
/// every monitor to finish so no session is left half-stopped.
///
/// A monitor that fails startup is logged and dropped; its siblings and
/// the process keep running until a stop signal arrives.
pub async fn run_monitors<F>(
    factory: Arc<F>,
    servers: Vec<String>,
    signer: Arc<LocalSigner>,
    networks: Vec<Network>,
    shutdown: CancellationToken,
) where
    F: SessionFactory,
{
    let mut monitors = JoinSet::new();
    for server in servers {
        let factory = Arc::clone(&factory);
        let signer = Arc::clone(&signer);
        let networks = networks.clone();
        let shutdown = shutdown.clone();
        let label = server.clone();
        monitors.spawn(async move {
            if let Err(e) = monitor_server_presence(factory, server, signer, networks, shutdown).await
            {
                error!(server = %label, error = %e, "Monitor failed");
            }
        });
    }

    // Redundant with each monitor's own wait, but guards against a signal
    // racing task spawn.
    shutdown.cancelled().await;
    while monitors.join_next().await.is_some() {}
}
