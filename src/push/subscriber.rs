// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Standing STOMP-over-WebSocket subscription for push notifications.
//!
//! One subscriber runs per signed-in session. It:
//! - Joins the user's topic and the broadcast topic
//! - Marks cached queries stale for each notification, then re-publishes it
//! - Sends heart-beats and drops a link that stops sending
//! - Reconnects after a fixed delay until told to stop or the session ends

use super::invalidation;
use super::stomp::{decode_frames, negotiate_heartbeat, Command, Frame, StompError};
use crate::cache::QueryCache;
use crate::config::Config;
use crate::models::Notification;
use crate::session::SessionState;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Topic every user receives.
pub const BROADCAST_TOPIC: &str = "/topic/notifications";

/// How long to wait for CONNECTED after sending CONNECT.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the notification broadcast channel.
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Subscriber errors
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("WebSocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("STOMP protocol error: {0}")]
    Protocol(#[from] StompError),

    #[error("Broker sent ERROR: {0}")]
    Broker(String),

    #[error("Broker did not answer CONNECT in time")]
    ConnectTimeout,

    #[error("No data from broker within {0:?}")]
    HeartbeatTimeout(Duration),

    #[error("Connection closed during handshake")]
    ClosedDuringHandshake,
}

/// How a connected session ended without an error.
enum SessionEnd {
    Shutdown,
    Closed,
}

/// Connection parameters for the notification link.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub url: String,
    pub reconnect_delay: Duration,
    pub heartbeat: Duration,
}

impl From<&Config> for SubscriberConfig {
    fn from(config: &Config) -> Self {
        Self {
            url: config.push_url(),
            reconnect_delay: config.reconnect_delay,
            heartbeat: config.heartbeat,
        }
    }
}

/// State shared between the connection task and its handle.
struct Shared {
    connected: AtomicBool,
    notifications: broadcast::Sender<Notification>,
}

/// Builder and connection loop for one user's notification link.
pub struct NotificationSubscriber {
    config: SubscriberConfig,
    user_id: i64,
    token: Option<String>,
    cache: Option<Arc<QueryCache>>,
    session: Option<watch::Receiver<SessionState>>,
}

/// Why the connection task should stop: its handle asked, or the session it
/// was started for is over.
struct StopSignal {
    user_id: i64,
    shutdown: watch::Receiver<bool>,
    session: Option<watch::Receiver<SessionState>>,
}

impl StopSignal {
    fn is_set(&self) -> bool {
        if *self.shutdown.borrow() {
            return true;
        }
        self.session.as_ref().is_some_and(|session| {
            let state = session.borrow();
            !state.is_authenticated() || state.user.as_ref().map(|u| u.id) != Some(self.user_id)
        })
    }

    /// Resolve once a stop is due. A dropped sender counts as one.
    async fn wait(&mut self) {
        while !self.is_set() {
            let Self {
                shutdown, session, ..
            } = &mut *self;
            let changed = match session {
                Some(session) => tokio::select! {
                    r = shutdown.changed() => r.is_ok(),
                    r = session.changed() => r.is_ok(),
                },
                None => shutdown.changed().await.is_ok(),
            };
            if !changed {
                return;
            }
        }
    }
}

impl NotificationSubscriber {
    pub fn new(config: impl Into<SubscriberConfig>, user_id: i64) -> Self {
        Self {
            config: config.into(),
            user_id,
            token: None,
            cache: None,
            session: None,
        }
    }

    /// Send the bearer token in the CONNECT frame.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Invalidate this cache for every notification received.
    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Stop once `session` is signed out or belongs to another user.
    pub fn with_session(mut self, session: watch::Receiver<SessionState>) -> Self {
        self.session = Some(session);
        self
    }

    /// Destinations subscribed to: the user's topic, then the broadcast topic.
    pub fn topics(&self) -> [String; 2] {
        [
            format!("{}/{}", BROADCAST_TOPIC, self.user_id),
            BROADCAST_TOPIC.to_string(),
        ]
    }

    /// Spawn the connection task.
    pub fn start(mut self) -> SubscriptionHandle {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            connected: AtomicBool::new(false),
            notifications,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stop = StopSignal {
            user_id: self.user_id,
            shutdown: shutdown_rx,
            session: self.session.take(),
        };

        tracing::info!(user_id = self.user_id, url = %self.config.url, "Starting notification subscriber");
        let task = tokio::spawn(self.run(shared.clone(), stop));

        SubscriptionHandle {
            shared,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    /// Connect, serve, and reconnect until stopped.
    async fn run(self, shared: Arc<Shared>, mut stop: StopSignal) {
        while !stop.is_set() {
            match self.session(&shared, &mut stop).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Closed) => {
                    tracing::info!(user_id = self.user_id, "Notification connection closed by broker")
                }
                Err(e) => {
                    tracing::warn!(user_id = self.user_id, error = %e, "Notification connection failed")
                }
            }
            shared.connected.store(false, Ordering::SeqCst);

            if stop.is_set() {
                break;
            }
            tracing::debug!(
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                "Reconnecting notification subscriber after delay"
            );
            tokio::select! {
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                _ = stop.wait() => break,
            }
        }

        shared.connected.store(false, Ordering::SeqCst);
        tracing::info!(user_id = self.user_id, "Notification subscriber stopped");
    }

    fn connect_frame(&self) -> Frame {
        let hb = self.config.heartbeat.as_millis();
        let mut frame = Frame::new(Command::Connect)
            .header("accept-version", "1.2,1.1,1.0")
            .header("heart-beat", format!("{},{}", hb, hb));
        if let Some(token) = &self.token {
            frame = frame.header("Authorization", format!("Bearer {}", token));
        }
        frame
    }

    /// One connection lifetime: handshake, subscribe, then pump frames.
    async fn session(
        &self,
        shared: &Shared,
        stop: &mut StopSignal,
    ) -> Result<SessionEnd, SubscriberError> {
        let ws: WsStream = tokio::select! {
            result = connect_async(self.config.url.as_str()) => result?.0,
            _ = stop.wait() => return Ok(SessionEnd::Shutdown),
        };
        let (mut write, mut read) = ws.split();

        write
            .send(Message::Text(self.connect_frame().encode()))
            .await?;

        // ─── Await CONNECTED ─────────────────────────────────────
        let connected = tokio::select! {
            result = tokio::time::timeout(CONNECT_TIMEOUT, await_connected(&mut read)) => {
                result.map_err(|_| SubscriberError::ConnectTimeout)??
            }
            _ = stop.wait() => return Ok(SessionEnd::Shutdown),
        };

        let hb = self.config.heartbeat.as_millis() as u64;
        let (outgoing, incoming) = negotiate_heartbeat((hb, hb), connected.get("heart-beat"));

        // ─── Subscribe ───────────────────────────────────────────
        for (i, topic) in self.topics().iter().enumerate() {
            let frame = Frame::new(Command::Subscribe)
                .header("id", format!("sub-{}", i))
                .header("destination", topic.as_str())
                .header("ack", "auto");
            write.send(Message::Text(frame.encode())).await?;
        }

        shared.connected.store(true, Ordering::SeqCst);
        tracing::info!(
            user_id = self.user_id,
            outgoing_ms = outgoing.as_millis() as u64,
            incoming_ms = incoming.as_millis() as u64,
            "Notification subscriber connected"
        );

        // ─── Pump ────────────────────────────────────────────────
        // A silent broker is presumed dead after twice the agreed period.
        let silence_limit = incoming * 2;
        let watchdog = tokio::time::sleep(silence_limit);
        tokio::pin!(watchdog);

        let beat_period = if outgoing.is_zero() {
            Duration::from_secs(3600)
        } else {
            outgoing
        };
        let mut beats = tokio::time::interval_at(Instant::now() + beat_period, beat_period);

        loop {
            tokio::select! {
                msg = read.next() => {
                    if !incoming.is_zero() {
                        watchdog.as_mut().reset(Instant::now() + silence_limit);
                    }
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_payload(shared, text.as_bytes())?,
                        Some(Ok(Message::Binary(bytes))) => self.handle_payload(shared, &bytes)?,
                        Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Closed),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                    }
                }
                _ = beats.tick(), if !outgoing.is_zero() => {
                    write.send(Message::Text("\n".to_string())).await?;
                }
                _ = &mut watchdog, if !incoming.is_zero() => {
                    return Err(SubscriberError::HeartbeatTimeout(silence_limit));
                }
                _ = stop.wait() => {
                    let frame = Frame::new(Command::Disconnect).header("receipt", "disconnect-0");
                    if let Err(e) = write.send(Message::Text(frame.encode())).await {
                        tracing::debug!(error = %e, "Failed to send DISCONNECT");
                    }
                    let _ = write.close().await;
                    return Ok(SessionEnd::Shutdown);
                }
            }
        }
    }

    fn handle_payload(&self, shared: &Shared, payload: &[u8]) -> Result<(), SubscriberError> {
        for frame in decode_frames(payload)? {
            match frame.command {
                Command::Message => self.handle_message(shared, &frame),
                Command::Error => {
                    let detail = frame
                        .get("message")
                        .map(str::to_string)
                        .unwrap_or_else(|| frame.body.clone());
                    return Err(SubscriberError::Broker(detail));
                }
                other => tracing::debug!(command = %other, "Ignoring STOMP frame"),
            }
        }
        Ok(())
    }

    fn handle_message(&self, shared: &Shared, frame: &Frame) {
        if frame.body.trim().is_empty() {
            return;
        }
        let notification: Notification = match serde_json::from_str(&frame.body) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    destination = frame.get("destination").unwrap_or_default(),
                    error = %e,
                    "Failed to parse notification"
                );
                return;
            }
        };

        if let Some(cache) = &self.cache {
            let count = invalidation::apply(cache, &notification);
            tracing::debug!(count, "Cache entries invalidated by notification");
        }

        tracing::info!(
            user_id = self.user_id,
            notification_id = notification.id,
            kind = notification
                .notification_type
                .as_ref()
                .map(|t| t.as_str())
                .unwrap_or("UNKNOWN"),
            "Notification received"
        );

        // No listeners is fine; the cache has already been updated.
        let _ = shared.notifications.send(notification);
    }
}

/// Read frames until CONNECTED. An ERROR frame or a close fails the handshake.
async fn await_connected(
    read: &mut futures_util::stream::SplitStream<WsStream>,
) -> Result<Frame, SubscriberError> {
    while let Some(msg) = read.next().await {
        let payload = match msg? {
            Message::Text(text) => text.into_bytes(),
            Message::Binary(bytes) => bytes,
            Message::Close(_) => return Err(SubscriberError::ClosedDuringHandshake),
            _ => continue,
        };
        for frame in decode_frames(&payload)? {
            match frame.command {
                Command::Connected => return Ok(frame),
                Command::Error => {
                    let detail = frame
                        .get("message")
                        .map(str::to_string)
                        .unwrap_or_else(|| frame.body.clone());
                    return Err(SubscriberError::Broker(detail));
                }
                _ => {}
            }
        }
    }
    Err(SubscriberError::ClosedDuringHandshake)
}

/// Handle to a running subscriber.
///
/// Dropping the handle stops the subscriber; [`SubscriptionHandle::disconnect`]
/// also waits for it to finish.
pub struct SubscriptionHandle {
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// True while subscribed to the broker.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Receive notifications from now on.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.shared.notifications.subscribe()
    }

    /// Send DISCONNECT, stop reconnecting and wait for the task to end.
    pub async fn disconnect(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Notification subscriber task failed");
            }
        }
        tracing::info!("Notification subscriber disconnected");
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber() -> NotificationSubscriber {
        NotificationSubscriber::new(&Config::default(), 42)
    }

    #[test]
    fn test_topics() {
        assert_eq!(
            subscriber().topics(),
            [
                "/topic/notifications/42".to_string(),
                "/topic/notifications".to_string()
            ]
        );
    }

    #[test]
    fn test_connect_frame() {
        let frame = subscriber().with_token("abc").connect_frame();
        assert_eq!(frame.command, Command::Connect);
        assert_eq!(frame.get("heart-beat"), Some("4000,4000"));
        assert_eq!(frame.get("Authorization"), Some("Bearer abc"));

        let frame = subscriber().connect_frame();
        assert_eq!(frame.get("Authorization"), None);
    }

    #[test]
    fn test_error_frame_fails_session() {
        let (notifications, _) = broadcast::channel(4);
        let shared = Shared {
            connected: AtomicBool::new(true),
            notifications,
        };
        let err = subscriber()
            .handle_payload(&shared, b"ERROR\nmessage:Access denied\n\n\0")
            .unwrap_err();
        assert!(matches!(err, SubscriberError::Broker(m) if m == "Access denied"));
    }

    #[tokio::test]
    async fn test_message_invalidates_and_publishes() {
        let cache = Arc::new(QueryCache::new());
        cache.insert(crate::cache::QueryKey::new("events"), serde_json::Value::Null);

        let (notifications, mut rx) = broadcast::channel(4);
        let shared = Shared {
            connected: AtomicBool::new(true),
            notifications,
        };
        let sub = subscriber().with_cache(cache.clone());

        sub.handle_payload(
            &shared,
            b"MESSAGE\ndestination:/topic/notifications\n\n{\"id\":1,\"type\":\"EVENT\"}\0",
        )
        .unwrap();
        // Garbage bodies are skipped without failing the session.
        sub.handle_payload(&shared, b"MESSAGE\n\nnot json\0").unwrap();

        let n = rx.recv().await.unwrap();
        assert_eq!(n.id, Some(1));
        assert!(rx.try_recv().is_err());
        assert!(!cache.is_fresh(&crate::cache::QueryKey::new("events")));
    }

    fn signed_in(user_id: i64) -> SessionState {
        SessionState {
            token: Some("tok".to_string()),
            user: Some(serde_json::from_value(serde_json::json!({"id": user_id})).unwrap()),
            is_loading: false,
        }
    }

    #[tokio::test]
    async fn test_stop_signal_follows_session() {
        let (_shutdown_tx, shutdown) = watch::channel(false);
        let (session_tx, session) = watch::channel(signed_in(42));
        let mut stop = StopSignal {
            user_id: 42,
            shutdown,
            session: Some(session),
        };
        assert!(!stop.is_set());

        // Unrelated session updates do not stop the subscriber.
        session_tx.send(signed_in(42)).unwrap();
        assert!(!stop.is_set());

        session_tx.send(signed_in(7)).unwrap();
        assert!(stop.is_set());
        tokio::time::timeout(Duration::from_secs(1), stop.wait())
            .await
            .expect("stop signal did not resolve");
    }

    #[tokio::test]
    async fn test_stop_signal_on_sign_out() {
        let (_shutdown_tx, shutdown) = watch::channel(false);
        let (session_tx, session) = watch::channel(signed_in(42));
        let mut stop = StopSignal {
            user_id: 42,
            shutdown,
            session: Some(session),
        };

        let waiter = tokio::spawn(async move {
            stop.wait().await;
            stop.is_set()
        });
        session_tx.send(SessionState {
            is_loading: false,
            ..SessionState::default()
        })
        .unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("stop signal did not resolve")
            .unwrap();
        assert!(stopped);
    }
}
