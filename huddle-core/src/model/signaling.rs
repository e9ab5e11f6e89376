use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Opaque negotiation descriptor (offer, answer or ICE material) produced by
/// the peer-connection layer. Neither the relay nor the signaling channel
/// interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalPayload(pub String);

impl From<&str> for SignalPayload {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SignalPayload {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Room-protocol messages exchanged with the relay, encoded as
/// `{"op": <event-name>, "d": <payload>}` JSON text frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    /// relay -> client, immediately after connect: the relay-assigned
    /// participant identifier for this session.
    Welcome { id: PeerId },

    /// client -> relay: enter the named room.
    JoinRoom {
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },

    /// relay -> joining client: identifiers of members already in the room
    /// (possibly empty).
    Roster(Vec<PeerId>),

    /// relay -> existing client: a newcomer's offer, forwarded verbatim.
    PeerJoined {
        #[serde(rename = "callerID")]
        caller_id: PeerId,
        signal: SignalPayload,
    },

    /// client -> relay: route an offer to one existing member.
    SendSignal {
        #[serde(rename = "userToSignal")]
        user_to_signal: PeerId,
        #[serde(rename = "callerID")]
        caller_id: PeerId,
        signal: SignalPayload,
    },

    /// client -> relay: route an answer back to the original caller.
    ReturnSignal {
        #[serde(rename = "callerID")]
        caller_id: PeerId,
        signal: SignalPayload,
    },

    /// relay -> original caller. `id` names the responder; the relay
    /// rewrites it from the sender of the matching return-signal.
    SignalReturned { id: PeerId, signal: SignalPayload },

    /// relay -> remaining members: a participant disconnected.
    PeerLeft { id: PeerId },
}
