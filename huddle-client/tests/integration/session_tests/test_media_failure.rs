use async_trait::async_trait;
use huddle_client::{LocalAudio, MediaError, MediaSource, RoomSession, SessionError};
use huddle_core::RoomId;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::init_tracing;
use crate::utils::{MockChannel, MockLinkFactory, assert_no_outbound};

struct DeniedMicrophone;

#[async_trait]
impl MediaSource for DeniedMicrophone {
    async fn acquire_local_audio(&self) -> Result<LocalAudio, MediaError> {
        Err(MediaError::PermissionDenied)
    }
}

#[tokio::test]
async fn media_failure_aborts_the_join_before_any_signaling() {
    init_tracing();

    let (channel, mut outbound) = MockChannel::new();
    let factory = MockLinkFactory::new();
    let (_relay_tx, relay_rx) = mpsc::channel(8);

    let result = RoomSession::join(
        RoomId::from("room-42"),
        Arc::new(DeniedMicrophone),
        channel.clone(),
        relay_rx,
        factory.clone(),
    )
    .await;

    match result {
        Err(SessionError::Media(MediaError::PermissionDenied)) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("join succeeded without local audio"),
    }

    // The relay never hears from a session that has no media.
    assert_no_outbound(&mut outbound).await;
    assert_eq!(factory.created_count().await, 0);
}

#[tokio::test]
async fn connect_acquires_media_before_dialing_the_relay() {
    init_tracing();

    // Nothing listens at this address. A media error, not a connect error,
    // shows acquisition happened before any dial attempt.
    let result = RoomSession::connect(
        "ws://127.0.0.1:1",
        RoomId::from("room-42"),
        Arc::new(DeniedMicrophone),
        MockLinkFactory::new(),
    )
    .await;

    match result {
        Err(SessionError::Media(MediaError::PermissionDenied)) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connect succeeded without local audio"),
    }
}
