//! Channel manager: the one duplex connection to the checkers server.
//!
//! Owns the socket, the connection state and the reconnect timer. Inbound text
//! frames are forwarded untouched on an unbounded channel; interpretation is the
//! translator's job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use checkers_domain::Session;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::infrastructure::messaging::{set_connection_state, ConnectionStateObserver};
use crate::ports::outbound::{ConnectionState, GameConnectionPort};

use super::core::{rejoin_command, should_reconnect, BackoffState, CloseKind, ReconnectPolicy};
use super::shared::CLOSE_GRACE_MS;
use super::timer::ReconnectTimer;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Work handed to the connection task.
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Inner {
    url: String,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConnectionState>,
    /// Present only while a connection is open
    outbound: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,
    inbound_tx: mpsc::UnboundedSender<String>,
    session_rx: watch::Receiver<Session>,
    timer: Mutex<ReconnectTimer>,
    backoff: Mutex<BackoffState>,
    task: Mutex<Option<JoinHandle<()>>>,
    /// Flag to track if the close was requested by the client
    intentional_close: AtomicBool,
}

/// Resilient WebSocket connection with reconnect and rejoin-on-open.
///
/// Cheap to clone; all clones drive the same connection. The connection task
/// keeps the manager alive, so release it with [`shutdown`](Self::shutdown),
/// [`close`](Self::close) or a [`ConnectionGuard`].
#[derive(Clone)]
pub struct ChannelManager {
    inner: Arc<Inner>,
}

impl ChannelManager {
    /// Create the manager and start connecting immediately.
    ///
    /// `session_rx` is read on every open: when it names both a player and a
    /// game, `rejoin <game>` is the first frame sent on the new connection.
    pub fn spawn(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        session_rx: watch::Receiver<Session>,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let manager = Self {
            inner: Arc::new(Inner {
                url: url.into(),
                policy,
                state_tx,
                outbound: Mutex::new(None),
                inbound_tx,
                session_rx,
                timer: Mutex::new(ReconnectTimer::new()),
                backoff: Mutex::new(BackoffState::default()),
                task: Mutex::new(None),
                intentional_close: AtomicBool::new(false),
            }),
        };
        manager.connect();
        (manager, inbound_rx)
    }

    /// (Re)open the connection, cancelling any scheduled reconnect.
    pub fn connect(&self) {
        self.inner.intentional_close.store(false, Ordering::SeqCst);
        lock(&self.inner.timer).cancel();
        lock(&self.inner.backoff).reset();
        self.open();
    }

    fn open(&self) {
        set_connection_state(&self.inner.state_tx, ConnectionState::Connecting);
        let manager = self.clone();
        let handle = tokio::spawn(async move { manager.run_connection().await });
        if let Some(previous) = lock(&self.inner.task).replace(handle) {
            previous.abort();
        }
    }

    async fn run_connection(self) {
        let close = match connect_async(self.inner.url.as_str()).await {
            Ok((socket, _)) => {
                tracing::info!(url = %self.inner.url, "Connected to game server");
                self.pump(socket).await
            }
            Err(e) => {
                tracing::warn!(url = %self.inner.url, error = %e, "Failed to connect to game server");
                set_connection_state(&self.inner.state_tx, ConnectionState::Errored);
                CloseKind::Abnormal
            }
        };

        if self.state() == ConnectionState::Errored {
            // Let observers see the error before the close moves the state on.
            tokio::task::yield_now().await;
        }
        self.handle_close(close);
    }

    /// Drive one open connection until it ends.
    async fn pump(&self, socket: Socket) -> CloseKind {
        let (mut write, mut read) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel();

        lock(&self.inner.backoff).reset();

        // Queued before the sender is published, so nothing can overtake it.
        let session = self.inner.session_rx.borrow().clone();
        if let Some(command) = rejoin_command(&session) {
            tracing::info!(?command, "Rejoining game on open");
            let _ = tx.send(Outbound::Text(command.to_string()));
        }
        *lock(&self.inner.outbound) = Some(tx);
        set_connection_state(&self.inner.state_tx, ConnectionState::Connected);

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(len = text.len(), "Inbound frame");
                        if self.inner.inbound_tx.send(text).is_err() {
                            tracing::debug!("Inbound receiver dropped; discarding frame");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.as_ref().map(|f| f.code);
                        tracing::info!(?code, "Server closed connection");
                        return CloseKind::from_code(code);
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WebSocket read error");
                        set_connection_state(&self.inner.state_tx, ConnectionState::Errored);
                        return CloseKind::Abnormal;
                    }
                    None => {
                        tracing::info!("Connection dropped without a close frame");
                        return CloseKind::Abnormal;
                    }
                },
                outbound = rx.recv() => match outbound {
                    Some(Outbound::Text(text)) => {
                        tracing::debug!(len = text.len(), "Outbound frame");
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::warn!(error = %e, "WebSocket write error");
                            set_connection_state(&self.inner.state_tx, ConnectionState::Errored);
                            return CloseKind::Abnormal;
                        }
                    }
                    Some(Outbound::Close) | None => {
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: "client closing".into(),
                        };
                        if let Err(e) = write.send(Message::Close(Some(frame))).await {
                            tracing::debug!(error = %e, "Close frame not delivered");
                        }
                        return CloseKind::Clean;
                    }
                },
            }
        }
    }

    fn handle_close(&self, close: CloseKind) {
        lock(&self.inner.outbound).take();
        set_connection_state(&self.inner.state_tx, ConnectionState::Disconnected);

        let intentional = self.inner.intentional_close.load(Ordering::SeqCst);
        if !should_reconnect(close, intentional) {
            tracing::info!(?close, intentional, "Connection closed; not reconnecting");
            return;
        }

        let (delay, attempt) = {
            let mut backoff = lock(&self.inner.backoff);
            let Some(delay) = backoff.next_delay_and_advance(&self.inner.policy) else {
                tracing::error!(
                    attempts = backoff.attempts(),
                    "Max reconnection attempts reached, giving up"
                );
                return;
            };
            (delay, backoff.attempts())
        };
        tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling reconnect");

        let manager = self.clone();
        lock(&self.inner.timer).schedule(delay, async move {
            // Check if shutdown was requested during the wait
            if manager.inner.intentional_close.load(Ordering::SeqCst) {
                tracing::info!("Reconnect cancelled - intentional close");
                return;
            }
            manager.open();
        });
    }

    /// Hand a text frame to the open connection.
    ///
    /// Returns `false` without queueing when not connected.
    pub fn send(&self, text: &str) -> bool {
        if self.state() != ConnectionState::Connected {
            tracing::debug!(state = %self.state(), "Dropping send while not connected");
            return false;
        }
        match lock(&self.inner.outbound).as_ref() {
            Some(tx) => tx.send(Outbound::Text(text.to_string())).is_ok(),
            None => false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    pub fn observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver::new(self.inner.state_tx.subscribe())
    }

    pub fn reconnect_pending(&self) -> bool {
        lock(&self.inner.timer).is_pending()
    }

    /// Release timer and socket without waiting.
    ///
    /// An open connection gets a Close frame; one still being established is aborted.
    pub fn shutdown(&self) {
        self.inner.intentional_close.store(true, Ordering::SeqCst);
        lock(&self.inner.timer).cancel();

        let delivered = lock(&self.inner.outbound)
            .take()
            .is_some_and(|tx| tx.send(Outbound::Close).is_ok());
        if !delivered {
            if let Some(task) = lock(&self.inner.task).take() {
                task.abort();
            }
        }
        set_connection_state(&self.inner.state_tx, ConnectionState::Disconnected);
    }

    /// Close gracefully, waiting briefly for the connection task to finish.
    pub async fn close(&self) {
        self.shutdown();
        let task = lock(&self.inner.task).take();
        if let Some(mut task) = task {
            let grace = Duration::from_millis(CLOSE_GRACE_MS);
            if tokio::time::timeout(grace, &mut task).await.is_err() {
                tracing::debug!("Connection task did not finish in time; aborting");
                task.abort();
            }
        }
        tracing::info!("Connection closed");
    }

    /// Tie the connection's lifetime to a scope.
    pub fn guard(&self) -> ConnectionGuard {
        ConnectionGuard {
            manager: self.clone(),
        }
    }
}

impl GameConnectionPort for ChannelManager {
    fn state(&self) -> ConnectionState {
        ChannelManager::state(self)
    }

    fn send_text(&self, text: &str) -> bool {
        self.send(text)
    }
}

/// Shuts the connection down when dropped, on every exit path.
pub struct ConnectionGuard {
    manager: ChannelManager,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.shutdown();
    }
}
