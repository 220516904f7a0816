//! Connection lifecycle and subscription bookkeeping.
//!
//! All shared state (connection state, subscription registry, outbound
//! queue) lives behind one mutex, so state transitions and registry edits
//! are atomic with respect to each other. The resubscription sweep runs in
//! the same critical section that flips the state to connected, which makes
//! it impossible for a concurrent subscribe/unsubscribe to be lost or
//! replayed twice within one connection cycle.
//!
//! Handler execution never happens on the read path: every data frame is
//! handed to its own task, and handler panics are contained there.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::{Config, ReconnectPolicy};
use crate::error::{ApiError, WallexError, excerpt};
use crate::ws::channels;
use crate::ws::messages::{InboundFrame, SubscriptionFrame};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsReceiver = SplitStream<WsStream>;

/// Callback invoked with the channel name and payload of an inbound message.
pub type MessageHandler = Arc<dyn Fn(&str, serde_json::Value) + Send + Sync>;

/// Callback invoked with streaming errors that have no direct caller, such
/// as protocol error frames and terminal reconnect failures.
pub type ErrorObserver = Arc<dyn Fn(WallexError) + Send + Sync>;

/// State of the logical streaming connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport session.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Live transport session.
    Connected,
    /// Explicit teardown in progress.
    Closing,
}

/// State guarded by the single serialization point.
struct ManagerState {
    conn: ConnectionState,
    /// Channel key -> handler. Iterated in key order by the sweep.
    registry: BTreeMap<String, MessageHandler>,
    /// Sender feeding the current session's writer task.
    outbound: Option<mpsc::UnboundedSender<Message>>,
    /// Session generation; stale tasks from a replaced session check this
    /// and stand down instead of touching fresh state.
    epoch: u64,
}

/// Shared core of a [`crate::ws::WsClient`].
pub(crate) struct Shared {
    pub(crate) config: Config,
    state: Mutex<ManagerState>,
    state_tx: watch::Sender<ConnectionState>,
    closing: watch::Sender<bool>,
    error_observer: Mutex<Option<ErrorObserver>>,
}

impl Shared {
    pub(crate) fn new(config: Config) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (closing, _) = watch::channel(false);
        Arc::new(Self {
            config,
            state: Mutex::new(ManagerState {
                conn: ConnectionState::Disconnected,
                registry: BTreeMap::new(),
                outbound: None,
                epoch: 0,
            }),
            state_tx,
            closing,
            error_observer: Mutex::new(None),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_conn(&self, st: &mut ManagerState, to: ConnectionState) {
        st.conn = to;
        self.state_tx.send_replace(to);
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.lock().conn
    }

    pub(crate) fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn set_error_observer(&self, observer: ErrorObserver) {
        let mut slot = self
            .error_observer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(observer);
    }

    fn emit_error(&self, err: WallexError) {
        let observer = self
            .error_observer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        match observer {
            Some(observer) => {
                tokio::spawn(async move { observer(err) });
            }
            None => tracing::warn!(error = %err, "streaming error (no observer registered)"),
        }
    }

    /// Connect to the streaming endpoint.
    ///
    /// A no-op when already connected or connecting. On handshake failure
    /// the state returns to disconnected and the classified error is handed
    /// to the caller; auto-reconnect only governs established sessions.
    pub(crate) async fn connect(self: Arc<Self>) -> Result<(), WallexError> {
        {
            let mut st = self.lock();
            match st.conn {
                ConnectionState::Connected | ConnectionState::Connecting => return Ok(()),
                ConnectionState::Closing => {
                    return Err(WallexError::ConnectionClosed {
                        reason: "client is closing".to_string(),
                    });
                }
                ConnectionState::Disconnected => {
                    self.set_conn(&mut st, ConnectionState::Connecting);
                }
            }
        }
        self.closing.send_replace(false);

        match establish(&self).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let mut st = self.lock();
                if st.conn == ConnectionState::Connecting {
                    self.set_conn(&mut st, ConnectionState::Disconnected);
                }
                Err(err)
            }
        }
    }

    /// Tear down the session. Idempotent and safe to call from any state.
    ///
    /// Subscriptions stay registered; a later [`Shared::connect`] restores
    /// them. Any in-flight reconnect wait is unblocked immediately.
    pub(crate) fn disconnect(&self) {
        let outbound = {
            let mut st = self.lock();
            if st.conn == ConnectionState::Disconnected {
                return;
            }
            self.set_conn(&mut st, ConnectionState::Closing);
            // Orphan the running session's tasks.
            st.epoch += 1;
            st.outbound.take()
        };

        self.closing.send_replace(true);

        if let Some(out) = outbound {
            let _ = out.send(Message::Close(None));
        }

        let mut st = self.lock();
        if st.conn == ConnectionState::Closing {
            self.set_conn(&mut st, ConnectionState::Disconnected);
        }
    }

    /// Wait until the state reaches connected, or fail with a timeout.
    pub(crate) async fn wait_connected(&self, timeout: Duration) -> Result<(), WallexError> {
        let mut rx = self.state_tx.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|s| *s == ConnectionState::Connected)).await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(WallexError::ConnectionClosed {
                reason: "client dropped".to_string(),
            }),
            Err(_) => Err(WallexError::Timeout),
        }
    }

    /// Register (or replace) a handler for a channel.
    ///
    /// While connected the subscribe frame is emitted immediately; otherwise
    /// the entry waits for the next connected transition to be replayed.
    pub(crate) fn subscribe(&self, channel: String, handler: MessageHandler) {
        let mut st = self.lock();
        st.registry.insert(channel.clone(), handler);
        if st.conn == ConnectionState::Connected {
            send_control(&st, SubscriptionFrame::subscribe(channel));
        }
    }

    /// Remove a channel. No-op when the key was never registered.
    pub(crate) fn unsubscribe(&self, channel: &str) {
        let mut st = self.lock();
        if st.registry.remove(channel).is_none() {
            return;
        }
        if st.conn == ConnectionState::Connected {
            send_control(&st, SubscriptionFrame::unsubscribe(channel));
        }
    }

    /// Remove every channel of one symbol.
    pub(crate) fn unsubscribe_symbol(&self, symbol: &str) {
        let prefix = channels::symbol_prefix(symbol);
        let mut st = self.lock();
        let keys: Vec<String> = st
            .registry
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        for key in keys {
            st.registry.remove(&key);
            if st.conn == ConnectionState::Connected {
                send_control(&st, SubscriptionFrame::unsubscribe(key));
            }
        }
    }

    /// Drop every registry entry. The only operation that empties the
    /// registry; disconnecting does not.
    pub(crate) fn clear_subscriptions(&self) {
        let mut st = self.lock();
        let keys: Vec<String> = st.registry.keys().cloned().collect();
        st.registry.clear();
        if st.conn == ConnectionState::Connected {
            for key in keys {
                send_control(&st, SubscriptionFrame::unsubscribe(key));
            }
        }
    }

    pub(crate) fn subscriptions(&self) -> Vec<String> {
        self.lock().registry.keys().cloned().collect()
    }

    pub(crate) fn is_subscribed(&self, channel: &str) -> bool {
        self.lock().registry.contains_key(channel)
    }
}

fn send_control(st: &ManagerState, frame: SubscriptionFrame) {
    let Some(out) = &st.outbound else { return };
    match frame.to_message() {
        Ok(msg) => {
            // Failure means the writer is gone; the reconnect path replays
            // the registry on the next session.
            let _ = out.send(msg);
        }
        Err(err) => tracing::warn!(error = %err, "failed to encode control frame"),
    }
}

/// Perform the handshake and install a fresh session.
///
/// Returns an explicitly boxed `Send` future. The box is not for
/// allocation's sake: it gives this function a concrete `Send` return type
/// in its signature, which terminates the recursive-async auto-trait
/// inference cycle (`read_loop` -> `session_ended` -> `reconnect_loop` ->
/// `establish` -> spawns `read_loop`) that otherwise leaves `read_loop`
/// unprovably `Send` at its `tokio::spawn`. Behaviour is unchanged.
fn establish<'a>(
    shared: &'a Arc<Shared>,
) -> Pin<Box<dyn Future<Output = Result<(), WallexError>> + Send + 'a>> {
    Box::pin(async move {
    let url = shared.config.ws_url.as_str();
    let ws = match tokio::time::timeout(shared.config.timeout, connect_async(url)).await {
        Err(_) => return Err(WallexError::Timeout),
        Ok(Err(e)) => return Err(e.into()),
        Ok(Ok((ws, _response))) => ws,
    };

    let (sink, stream) = ws.split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Message>();

    let epoch = {
        let mut st = shared.lock();
        // Only a pending Connecting transition may install a session; a
        // disconnect() racing the handshake leaves any other state behind.
        if st.conn != ConnectionState::Connecting {
            return Err(WallexError::ConnectionClosed {
                reason: "connection attempt cancelled".to_string(),
            });
        }
        st.epoch += 1;
        st.outbound = Some(out_tx.clone());
        shared.set_conn(&mut st, ConnectionState::Connected);

        // Resubscription sweep: replay every stored entry, in key order,
        // exactly once per connected transition. Runs under the same lock
        // as the state flip so concurrent registry edits cannot interleave.
        if !st.registry.is_empty() {
            tracing::debug!(channels = st.registry.len(), "replaying subscriptions");
        }
        for channel in st.registry.keys() {
            match SubscriptionFrame::subscribe(channel.clone()).to_message() {
                Ok(msg) => {
                    let _ = out_tx.send(msg);
                }
                Err(err) => {
                    tracing::warn!(channel = %channel, error = %err, "failed to encode subscribe frame");
                }
            }
        }
        st.epoch
    };

    tokio::spawn(write_loop(out_rx, sink));
    tokio::spawn(read_loop(shared.clone(), epoch, stream));

    Ok(())
    })
}

/// Drain the outbound queue into the transport sink.
async fn write_loop(mut rx: mpsc::UnboundedReceiver<Message>, mut sink: WsSink) {
    while let Some(msg) = rx.recv().await {
        let is_close = matches!(msg, Message::Close(_));
        if let Err(err) = sink.send(msg).await {
            tracing::warn!(error = %err, "failed to send frame");
            break;
        }
        if is_close {
            break;
        }
    }
    let _ = sink.close().await;
}

/// Read inbound frames until the session ends, then hand off to the
/// reconnect logic.
async fn read_loop(shared: Arc<Shared>, epoch: u64, mut stream: WsReceiver) {
    let mut closing = shared.closing.subscribe();

    let reason = loop {
        tokio::select! {
            _ = closing.wait_for(|closing| *closing) => break "closed by client".to_string(),
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch(&shared, epoch, &text),
                Some(Ok(Message::Binary(data))) => {
                    if let Ok(text) = String::from_utf8(data.to_vec()) {
                        dispatch(&shared, epoch, &text);
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) => break "closed by peer".to_string(),
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "WebSocket transport error");
                    break err.to_string();
                }
                None => break "stream ended".to_string(),
            }
        }
    };

    session_ended(shared, epoch, reason).await;
}

/// Route one inbound frame.
fn dispatch(shared: &Arc<Shared>, epoch: u64, text: &str) {
    let frame = match InboundFrame::parse(text) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "dropping malformed frame");
            return;
        }
    };

    match frame {
        InboundFrame::Error { error, message } => {
            let code = match &error {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            shared.emit_error(WallexError::Api(ApiError {
                status: None,
                code: Some(code),
                message: message.unwrap_or_else(|| "streaming error frame".to_string()),
                payload: Some(excerpt(text)),
            }));
        }
        InboundFrame::Channel { channel, data } => {
            let handler = {
                let st = shared.lock();
                if st.epoch != epoch {
                    // Stale session; a newer one owns the registry now.
                    return;
                }
                st.registry.get(&channel).cloned()
            };

            match handler {
                Some(handler) => {
                    // One task per message so a slow handler cannot stall
                    // the read loop or delivery to other channels.
                    tokio::spawn(async move {
                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                            || handler(&channel, data),
                        ));
                        if outcome.is_err() {
                            tracing::error!(channel = %channel, "message handler panicked");
                        }
                    });
                }
                None => {
                    tracing::debug!(channel = %channel, "dropping message for channel with no handler");
                }
            }
        }
    }
}

/// Handle the end of a transport session: flip the state and, for
/// unexpected drops, drive the reconnect policy.
async fn session_ended(shared: Arc<Shared>, epoch: u64, reason: String) {
    {
        let mut st = shared.lock();
        if st.epoch != epoch {
            return;
        }
        st.outbound = None;
        let was_closing = matches!(
            st.conn,
            ConnectionState::Closing | ConnectionState::Disconnected
        );
        shared.set_conn(&mut st, ConnectionState::Disconnected);
        if was_closing {
            return;
        }
    }

    tracing::info!(reason = %reason, "WebSocket disconnected");
    reconnect_loop(shared).await;
}

/// Re-enter the connecting state with exponential backoff until a session
/// is established, the policy is exhausted, or the client is closed.
async fn reconnect_loop(shared: Arc<Shared>) {
    let policy = shared.config.reconnect.clone();
    let mut closing = shared.closing.subscribe();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        if let Some(max) = policy.max_attempts {
            if attempt > max {
                tracing::error!(attempts = max, "reconnect attempts exhausted");
                shared.emit_error(WallexError::ConnectionClosed {
                    reason: format!("reconnect attempts exhausted after {max}"),
                });
                return;
            }
        }

        let backoff = reconnect_backoff(&policy, attempt);
        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = closing.wait_for(|closing| *closing) => return,
        }

        {
            let mut st = shared.lock();
            if st.conn != ConnectionState::Disconnected {
                // disconnect() or an explicit connect() took over.
                return;
            }
            shared.set_conn(&mut st, ConnectionState::Connecting);
        }
        tracing::info!(attempt, "reconnecting");

        match establish(&shared).await {
            Ok(()) => {
                tracing::info!(attempt, "reconnected");
                return;
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "reconnect attempt failed");
                let mut st = shared.lock();
                if st.conn == ConnectionState::Connecting {
                    shared.set_conn(&mut st, ConnectionState::Disconnected);
                }
            }
        }
    }
}

/// Backoff before reconnect attempt `attempt` (1-based): the initial
/// backoff doubled per attempt, capped at the policy ceiling.
fn reconnect_backoff(policy: &ReconnectPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    policy
        .initial_backoff
        .saturating_mul(2u32.saturating_pow(exponent))
        .min(policy.max_backoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_reconnect_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            max_attempts: None,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        };

        assert_eq!(reconnect_backoff(&policy, 1), Duration::from_secs(1));
        assert_eq!(reconnect_backoff(&policy, 2), Duration::from_secs(2));
        assert_eq!(reconnect_backoff(&policy, 4), Duration::from_secs(8));
        // 2^10 seconds would be 1024s; capped at the ceiling.
        assert_eq!(reconnect_backoff(&policy, 11), Duration::from_secs(60));
    }

    #[test]
    fn test_registry_replace_and_remove() {
        let shared = Shared::new(test_config());

        let handler: MessageHandler = Arc::new(|_, _| {});
        shared.subscribe("BTCUSDT@trade".to_string(), handler.clone());
        shared.subscribe("BTCUSDT@trade".to_string(), handler.clone());
        shared.subscribe("ETHUSDT@ticker".to_string(), handler);

        // Re-registering the same key replaces, not duplicates.
        assert_eq!(
            shared.subscriptions(),
            vec!["BTCUSDT@trade".to_string(), "ETHUSDT@ticker".to_string()]
        );

        shared.unsubscribe("BTCUSDT@trade");
        assert!(!shared.is_subscribed("BTCUSDT@trade"));
        // Unsubscribing an unknown key is a no-op.
        shared.unsubscribe("BTCUSDT@trade");
        assert!(shared.is_subscribed("ETHUSDT@ticker"));
    }

    #[test]
    fn test_unsubscribe_symbol_removes_all_channels() {
        let shared = Shared::new(test_config());
        let handler: MessageHandler = Arc::new(|_, _| {});

        shared.subscribe("BTCUSDT@trade".to_string(), handler.clone());
        shared.subscribe("BTCUSDT@ticker".to_string(), handler.clone());
        shared.subscribe("ETHUSDT@trade".to_string(), handler);

        shared.unsubscribe_symbol("BTCUSDT");

        assert_eq!(shared.subscriptions(), vec!["ETHUSDT@trade".to_string()]);
    }

    #[test]
    fn test_disconnect_keeps_registry() {
        let shared = Shared::new(test_config());
        let handler: MessageHandler = Arc::new(|_, _| {});
        shared.subscribe("BTCUSDT@trade".to_string(), handler);

        shared.disconnect();
        assert_eq!(shared.state(), ConnectionState::Disconnected);
        assert!(shared.is_subscribed("BTCUSDT@trade"));

        shared.clear_subscriptions();
        assert!(shared.subscriptions().is_empty());
    }

    #[test]
    fn test_disconnect_idempotent_from_disconnected() {
        let shared = Shared::new(test_config());
        shared.disconnect();
        shared.disconnect();
        assert_eq!(shared.state(), ConnectionState::Disconnected);
    }
}
