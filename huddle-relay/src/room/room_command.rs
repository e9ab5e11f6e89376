use huddle_core::{PeerId, SignalPayload};

/// Commands entering a room's event loop from the WebSocket handlers.
#[derive(Debug)]
pub enum RoomCommand {
    /// A connected participant asked to join this room.
    Join { peer_id: PeerId },

    /// An offer from `caller_id`, to be delivered to `target` as
    /// peer-joined.
    ForwardSignal {
        caller_id: PeerId,
        target: PeerId,
        signal: SignalPayload,
    },

    /// An answer from `responder_id`, to be delivered to `caller_id` as
    /// signal-returned.
    ReturnSignal {
        responder_id: PeerId,
        caller_id: PeerId,
        signal: SignalPayload,
    },

    /// The participant's WebSocket went away.
    Disconnect { peer_id: PeerId },
}
