pub mod channel;
pub mod error;
pub mod link;
pub mod media;
pub mod registry;
pub mod session;

pub use channel::{ChannelEvent, SignalingChannel, WsChannel};
pub use error::{ChannelError, MediaError, NegotiationError, RegistryError, SessionError};
pub use link::{
    LinkDriver, LinkEvent, LinkFactory, LinkState, PeerLink, Role, RtcConfig, RtcLinkFactory,
};
pub use media::{LocalAudio, MediaSource, RemoteAudio, SilentAudioSource};
pub use registry::{PeerEntry, PeerRegistry};
pub use session::{RoomSession, SessionEvent, SessionHandle};
