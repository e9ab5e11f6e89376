use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{PeerId, SignalMessage, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
}

/// Registry of live WebSocket connections, keyed by relay-assigned peer id.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn send_message(&self, peer_id: &PeerId, msg: SignalMessage) {
        if let Some(peer) = self.inner.peers.get(peer_id) {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            warn!("Attempted to send signal to disconnected user {}", peer_id);
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_roster(&self, peer_id: PeerId, members: Vec<PeerId>) {
        self.send_message(&peer_id, SignalMessage::Roster(members));
    }

    async fn send_peer_joined(&self, target: PeerId, caller_id: PeerId, signal: SignalPayload) {
        self.send_message(&target, SignalMessage::PeerJoined { caller_id, signal });
    }

    async fn send_signal_returned(
        &self,
        caller_id: PeerId,
        responder_id: PeerId,
        signal: SignalPayload,
    ) {
        self.send_message(
            &caller_id,
            SignalMessage::SignalReturned {
                id: responder_id,
                signal,
            },
        );
    }

    async fn send_peer_left(&self, target: PeerId, id: PeerId) {
        self.send_message(&target, SignalMessage::PeerLeft { id });
    }
}
