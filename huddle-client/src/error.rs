use huddle_core::PeerId;
use thiserror::Error;

/// Local audio could not be acquired. The session must not proceed to join.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("audio capture permission denied")]
    PermissionDenied,

    #[error("no audio capture device available")]
    NoDevice,

    #[error("media backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to relay: {0}")]
    Connect(String),

    #[error("relay connection closed")]
    Closed,

    #[error("failed to encode signal message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Webrtc(#[from] webrtc::Error),

    #[error("malformed session descriptor: {0}")]
    BadDescriptor(serde_json::Error),

    #[error("local descriptor missing after gathering")]
    MissingDescriptor,

    #[error("link is not in a state that accepts a remote signal")]
    InvalidState,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("peer {0} already registered")]
    AlreadyExists(PeerId),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("relay closed before assigning a participant identifier")]
    NoWelcome,
}
