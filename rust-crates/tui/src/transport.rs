//! The persistent WebSocket to the game server, scoped to one room and one
//! local player.

use board_core::{
    protocol::{
        Intent,
        ServerMessage,
    },
    session::SessionContext,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use futures::{
    SinkExt,
    StreamExt,
};
use std::sync::{
    Arc,
    atomic::{
        AtomicBool,
        Ordering,
    },
};
use tokio::{
    sync::{
        mpsc,
        oneshot,
    },
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message,
};
use tracing::{
    debug,
    info,
    warn,
};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Message(ServerMessage),
    Disconnected,
}

/// Where the channel connects: `ws[s]://host[:port]/ws/game/{room}/{player}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEndpoint {
    url: Url,
}

impl ChannelEndpoint {
    pub fn for_session(server_url: &Url, session: &SessionContext) -> Result<Self> {
        let mut url = server_url.clone();
        let scheme = match server_url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(eyre!("unsupported server URL scheme: {other}")),
        };
        url.set_scheme(scheme)
            .map_err(|_| eyre!("cannot derive a WebSocket URL from {server_url}"))?;
        url.set_query(None);
        url.set_fragment(None);
        url.set_path("/");
        url.path_segments_mut()
            .map_err(|_| eyre!("server URL {server_url} cannot carry a path"))?
            .pop_if_empty()
            .extend(["ws", "game", session.room_id.as_str(), session.player_id.as_str()]);
        Ok(Self { url })
    }

    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Outbound half of a channel as seen by the controller.
pub trait IntentSink {
    /// Queues `intent` if the channel is open; otherwise drops it. Returns
    /// whether it was queued.
    fn send(&self, intent: Intent) -> bool;

    fn is_open(&self) -> bool;

    /// Closes the channel. Calling it again is a no-op.
    fn close(&mut self);
}

pub struct GameChannel {
    open: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<Intent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl GameChannel {
    /// Starts connecting in the background. Connectivity changes and inbound
    /// messages arrive on the returned receiver.
    pub fn connect(endpoint: ChannelEndpoint) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let open = Arc::new(AtomicBool::new(false));
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_channel(
            endpoint,
            open.clone(),
            outbound_rx,
            shutdown_rx,
            events_tx,
        ));
        let channel = Self {
            open,
            outbound,
            shutdown: Some(shutdown),
            task: Some(task),
        };
        (channel, events_rx)
    }

    /// Closes the channel and waits for the socket task to finish.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(?err, "channel task ended abnormally");
        }
    }
}

impl IntentSink for GameChannel {
    fn send(&self, intent: Intent) -> bool {
        if !self.is_open() {
            debug!(?intent, "channel not open; dropping intent");
            return false;
        }
        self.outbound.send(intent).is_ok()
    }

    fn is_open(&self) -> bool {
        self.shutdown.is_some() && self.open.load(Ordering::Acquire)
    }

    fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            info!("closing game channel");
            self.open.store(false, Ordering::Release);
            let _ = shutdown.send(());
        }
    }
}

impl Drop for GameChannel {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_channel(
    endpoint: ChannelEndpoint,
    open: Arc<AtomicBool>,
    mut outbound_rx: mpsc::UnboundedReceiver<Intent>,
    mut shutdown_rx: oneshot::Receiver<()>,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
) {
    let url = endpoint.url().as_str();
    let connected = tokio::select! {
        _ = &mut shutdown_rx => return,
        result = connect_async(url) => result,
    };
    let socket = match connected {
        Ok((socket, _response)) => socket,
        Err(err) => {
            warn!(%url, %err, "game channel connection failed");
            let _ = events_tx.send(ChannelEvent::Disconnected);
            return;
        }
    };
    info!(%url, "game channel connected");
    open.store(true, Ordering::Release);
    let _ = events_tx.send(ChannelEvent::Connected);

    let (mut sink, mut stream) = socket.split();
    let closed_locally = loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                let _ = sink.send(Message::Close(None)).await;
                break true;
            }
            intent = outbound_rx.recv() => {
                let Some(intent) = intent else {
                    break true;
                };
                let text = match intent.encode() {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(?intent, %err, "failed to encode intent");
                        continue;
                    }
                };
                if let Err(err) = sink.send(Message::text(text)).await {
                    warn!(%err, "game channel send failed");
                    break false;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text) {
                    Ok(message) => {
                        if events_tx.send(ChannelEvent::Message(message)).is_err() {
                            break true;
                        }
                    }
                    Err(err) => warn!(%err, "dropping malformed server message"),
                },
                Some(Ok(Message::Close(_))) | None => break false,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(%err, "game channel read failed");
                    break false;
                }
            },
        }
    };

    open.store(false, Ordering::Release);
    if closed_locally {
        debug!("game channel closed locally");
    } else {
        info!("game channel disconnected");
        let _ = events_tx.send(ChannelEvent::Disconnected);
    }
}
