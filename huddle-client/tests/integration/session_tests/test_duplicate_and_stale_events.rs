use huddle_core::{PeerId, SignalMessage, SignalPayload};

use crate::init_tracing;
use crate::utils::{assert_no_outbound, recv_outbound, start_session};

#[tokio::test]
async fn duplicate_peer_joined_is_suppressed() {
    init_tracing();

    let mut session = start_session("room-42").await;
    let newcomer = PeerId::new();

    let joined = SignalMessage::PeerJoined {
        caller_id: newcomer.clone(),
        signal: SignalPayload::from("OFFER"),
    };

    session.relay(joined.clone()).await;
    assert!(matches!(
        recv_outbound(&mut session.outbound).await,
        SignalMessage::ReturnSignal { .. }
    ));

    // Protocol violation: same caller announcing itself again. No registry
    // mutation, no extra outbound traffic.
    session.relay(joined).await;

    assert_no_outbound(&mut session.outbound).await;
    assert_eq!(session.factory.created_count().await, 1);
}

#[tokio::test]
async fn stale_signal_returned_is_ignored_without_breaking_the_session() {
    init_tracing();

    let mut session = start_session("room-42").await;

    session
        .relay(SignalMessage::SignalReturned {
            id: PeerId::new(),
            signal: SignalPayload::from("ANSWER"),
        })
        .await;

    // The session keeps processing: a later peer-joined still produces a
    // responder and a return-signal.
    let newcomer = PeerId::new();
    session
        .relay(SignalMessage::PeerJoined {
            caller_id: newcomer.clone(),
            signal: SignalPayload::from("OFFER"),
        })
        .await;

    match recv_outbound(&mut session.outbound).await {
        SignalMessage::ReturnSignal { caller_id, .. } => assert_eq!(caller_id, newcomer),
        other => panic!("expected return-signal, got {:?}", other),
    }
}
