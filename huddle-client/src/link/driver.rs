use crate::error::NegotiationError;
use crate::media::{LocalAudio, RemoteAudio};
use async_trait::async_trait;
use huddle_core::{PeerId, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events a link reports into the session's event loop. Negotiation and
/// connectivity proceed asynchronously; this serialized stream is the only
/// way they reach the registry.
pub enum LinkEvent {
    /// The local descriptor is finalized (all candidates gathered) and ready
    /// to be relayed. Raised exactly once per link.
    SignalReady {
        peer_id: PeerId,
        signal: SignalPayload,
    },

    /// The remote participant's audio track became available.
    RemoteTrack {
        peer_id: PeerId,
        track: RemoteAudio,
    },

    /// Negotiation completed and media is flowing.
    Connected { peer_id: PeerId },

    /// The underlying connection failed, closed, or lost its remote.
    Closed { peer_id: PeerId },
}

/// The underlying peer-connection capability for exactly one remote
/// participant: produces local descriptors, consumes remote ones. ICE and
/// SDP internals stay below this seam.
#[async_trait]
pub trait LinkDriver: Send + Sync {
    /// Produce a self-contained offer. Resolves only once candidate
    /// gathering is complete (non-trickle).
    async fn create_offer(&self) -> Result<SignalPayload, NegotiationError>;

    /// Produce a self-contained answer to a previously applied offer.
    async fn create_answer(&self) -> Result<SignalPayload, NegotiationError>;

    /// Feed a remote descriptor into the connection.
    async fn apply_remote(&self, signal: &SignalPayload) -> Result<(), NegotiationError>;

    async fn close(&self);
}

/// Builds one driver per remote participant, wired to the session's link
/// event stream and carrying the shared local audio track.
#[async_trait]
pub trait LinkFactory: Send + Sync {
    async fn create(
        &self,
        peer_id: PeerId,
        local_audio: LocalAudio,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Arc<dyn LinkDriver>, NegotiationError>;
}
