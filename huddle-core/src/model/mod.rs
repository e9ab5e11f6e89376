mod peer;
mod room;
mod signaling;

pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{SignalMessage, SignalPayload};
