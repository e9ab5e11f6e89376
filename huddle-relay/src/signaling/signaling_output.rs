use async_trait::async_trait;
use huddle_core::{PeerId, SignalPayload};

/// Delivery seam between a room's event loop and the transport holding the
/// actual client connections. Implemented by the WebSocket service in
/// production and by capture mocks in tests.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver the roster of existing members to a joining participant.
    async fn send_roster(&self, peer_id: PeerId, members: Vec<PeerId>);

    /// Deliver a newcomer's offer to one existing member.
    async fn send_peer_joined(&self, target: PeerId, caller_id: PeerId, signal: SignalPayload);

    /// Deliver a responder's answer back to the original caller.
    async fn send_signal_returned(
        &self,
        caller_id: PeerId,
        responder_id: PeerId,
        signal: SignalPayload,
    );

    /// Tell a remaining member that a participant disconnected.
    async fn send_peer_left(&self, target: PeerId, id: PeerId);
}
