use crate::error::ChannelError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use huddle_core::SignalMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// Notifications surfaced by the channel, in the order received from the
/// relay. Never reordered or deduplicated.
#[derive(Debug)]
pub enum ChannelEvent {
    Message(SignalMessage),
    Closed,
}

/// Outbound half of the relay connection. One channel per session; no
/// auto-reconnect (reconnection policy belongs to the embedder).
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send(&self, msg: SignalMessage) -> Result<(), ChannelError>;

    /// Begin an orderly shutdown of the connection.
    async fn close(&self);
}

/// WebSocket-backed channel. The socket is split into a writer task fed by
/// an unbounded queue and a reader task that decodes frames into
/// `ChannelEvent`s.
pub struct WsChannel {
    out_tx: mpsc::UnboundedSender<Message>,
}

impl WsChannel {
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<ChannelEvent>), ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        debug!("Connected to relay at {}", url);

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if sink.send(msg).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(msg) => {
                                if event_tx.send(ChannelEvent::Message(msg)).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => warn!("Invalid frame from relay: {:?}", e),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay connection error: {}", e);
                        break;
                    }
                }
            }
            let _ = event_tx.send(ChannelEvent::Closed).await;
        });

        Ok((Self { out_tx }, event_rx))
    }
}

#[async_trait]
impl SignalingChannel for WsChannel {
    async fn send(&self, msg: SignalMessage) -> Result<(), ChannelError> {
        let json = serde_json::to_string(&msg)?;
        self.out_tx
            .send(Message::Text(json))
            .map_err(|_| ChannelError::Closed)
    }

    async fn close(&self) {
        let _ = self.out_tx.send(Message::Close(None));
    }
}
