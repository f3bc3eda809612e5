//! Matrix client-server adapter.
//!
//! Thin REST client over the r0 API: password login with the signer's
//! derived credentials, a long-polling `/sync` listener task feeding the
//! presence channel, and idempotent room joins. No state is kept beyond
//! the access token and the sync batch cursor.

use crate::client::{
    ClientError, ClientSession, PresenceEvent, SessionFactory, UserPresence,
};
use crate::rooms;
use crate::signer::LocalSigner;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Builds [`MatrixSession`]s sharing one HTTP connection pool.
pub struct MatrixFactory {
    http: reqwest::Client,
}

impl MatrixFactory {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("presenced/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl SessionFactory for MatrixFactory {
    type Session = MatrixSession;

    async fn create_client(&self, server_url: &str) -> Result<MatrixSession, ClientError> {
        let server_host = rooms::server_host(server_url)
            .map_err(|_| ClientError::InvalidUrl(server_url.to_string()))?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(MatrixSession {
            http: self.http.clone(),
            base: server_url.trim_end_matches('/').to_string(),
            server_host,
            access_token: None,
            events_tx: Some(events_tx),
            events_rx: Some(events_rx),
            listener: None,
            cancel: CancellationToken::new(),
        })
    }
}

/// One authenticated connection to a Matrix homeserver.
pub struct MatrixSession {
    http: reqwest::Client,
    base: String,
    server_host: String,
    access_token: Option<String>,
    events_tx: Option<mpsc::UnboundedSender<PresenceEvent>>,
    events_rx: Option<mpsc::UnboundedReceiver<PresenceEvent>>,
    listener: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user_id: String,
}

#[derive(Deserialize)]
struct SyncResponse {
    next_batch: String,
    #[serde(default)]
    presence: PresenceSection,
}

#[derive(Deserialize, Default)]
struct PresenceSection {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    sender: Option<String>,
    content: Option<RawPresenceContent>,
}

#[derive(Deserialize)]
struct RawPresenceContent {
    presence: Option<String>,
}

#[async_trait]
impl ClientSession for MatrixSession {
    async fn login(&mut self, signer: &LocalSigner) -> Result<(), ClientError> {
        let body = json!({
            "type": "m.login.password",
            "identifier": {
                "type": "m.user",
                "user": signer.address_hex().to_lowercase(),
            },
            "password": signer.sign_hex(self.server_host.as_bytes()),
            "device_id": "PRESENCED",
        });
        let resp = self
            .http
            .post(format!("{}/_matrix/client/r0/login", self.base))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Login {
                server: self.server_host.clone(),
                reason: resp.status().to_string(),
            });
        }
        let login: LoginResponse = resp.json().await?;
        debug!(server = %self.server_host, user_id = %login.user_id, "Logged in");
        self.access_token = Some(login.access_token);
        Ok(())
    }

    fn presence_events(&mut self) -> Result<mpsc::UnboundedReceiver<PresenceEvent>, ClientError> {
        self.events_rx.take().ok_or(ClientError::PresenceChannelTaken)
    }

    async fn start_listener(
        &mut self,
        poll_timeout: Duration,
        poll_delay: Duration,
    ) -> Result<(), ClientError> {
        let token = self.access_token.clone().ok_or(ClientError::NotLoggedIn)?;
        let tx = self.events_tx.clone().ok_or(ClientError::NotLoggedIn)?;
        let http = self.http.clone();
        let base = self.base.clone();
        let server_host = self.server_host.clone();
        let cancel = self.cancel.clone();
        let timeout_ms = poll_timeout.as_millis().to_string();

        self.listener = Some(tokio::spawn(async move {
            let mut since: Option<String> = None;
            let mut update_id: u64 = 0;
            loop {
                let mut req = http
                    .get(format!("{base}/_matrix/client/r0/sync"))
                    .bearer_auth(&token)
                    .query(&[("timeout", timeout_ms.as_str())]);
                if let Some(batch) = &since {
                    req = req.query(&[("since", batch.as_str())]);
                }
                let resp = tokio::select! {
                    _ = cancel.cancelled() => break,
                    resp = req.send() => resp,
                };
                match resp.and_then(|r| r.error_for_status()) {
                    Ok(resp) => match resp.json::<SyncResponse>().await {
                        Ok(sync) => {
                            since = Some(sync.next_batch);
                            for event in sync.presence.events {
                                if event.kind != "m.presence" {
                                    continue;
                                }
                                let (Some(sender), Some(content)) = (event.sender, event.content)
                                else {
                                    continue;
                                };
                                let Some(raw) = content.presence else { continue };
                                let sent = tx.send(PresenceEvent {
                                    user_id: sender,
                                    presence: UserPresence::parse(&raw),
                                    update_id,
                                });
                                update_id += 1;
                                if sent.is_err() {
                                    // Receiver gone: the monitor stopped.
                                    return;
                                }
                            }
                        }
                        Err(e) => warn!(server = %server_host, error = %e, "Sync decode failed"),
                    },
                    Err(e) => warn!(server = %server_host, error = %e, "Sync poll failed"),
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(poll_delay) => {}
                }
            }
        }));
        Ok(())
    }

    async fn join_broadcast_room(&self, room_address: &str) -> Result<(), ClientError> {
        let token = self.access_token.as_ref().ok_or(ClientError::NotLoggedIn)?;
        let resp = self
            .http
            .post(format!(
                "{}/_matrix/client/r0/join/{}",
                self.base,
                encode_room_address(room_address)
            ))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::JoinRoom {
                alias: room_address.to_string(),
                reason: resp.status().to_string(),
            })
        }
    }

    async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.listener.take() {
            let _ = handle.await;
        }
        self.events_tx = None;
    }
}

impl Drop for MatrixSession {
    fn drop(&mut self) {
        // The listener task only holds clones of this token and the
        // sender; cancelling here stops it even if the session is dropped
        // without an explicit stop().
        self.cancel.cancel();
    }
}

/// Percent-encode the characters a room address puts in a URL path.
fn encode_room_address(address: &str) -> String {
    address.replace('#', "%23").replace(':', "%3A")
}
