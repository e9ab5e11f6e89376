use huddle_client::SessionEvent;
use huddle_core::{PeerId, SignalMessage, SignalPayload};

use crate::init_tracing;
use crate::utils::{assert_no_outbound, recv_outbound, start_session, wait_until};

#[tokio::test]
async fn failed_offer_removes_the_entry_while_a_healthy_peer_completes() {
    init_tracing();

    let mut session = start_session("room-42").await;
    let doomed = PeerId::new();
    let healthy = PeerId::new();

    session.factory.fail_offer_for(&doomed).await;
    session
        .relay(SignalMessage::Roster(vec![doomed.clone(), healthy.clone()]))
        .await;

    // The failed link is torn down and leaves the registry.
    session
        .wait_for_event(
            |evt| matches!(evt, SessionEvent::PeerClosed { peer_id } if *peer_id == doomed),
        )
        .await;
    session
        .wait_for_event(|evt| matches!(evt, SessionEvent::RosterSize(1)))
        .await;

    // The healthy peer's exchange proceeds as if the failure never happened.
    match recv_outbound(&mut session.outbound).await {
        SignalMessage::SendSignal { user_to_signal, .. } => {
            assert_eq!(user_to_signal, healthy);
        }
        other => panic!("expected send-signal, got {:?}", other),
    }
    assert_no_outbound(&mut session.outbound).await;

    session
        .relay(SignalMessage::SignalReturned {
            id: healthy.clone(),
            signal: SignalPayload::from("ANSWER"),
        })
        .await;

    let driver = session.factory.driver_for(&healthy).await;
    wait_until(|| {
        let driver = driver.clone();
        async move { driver.applied().await == vec![SignalPayload::from("ANSWER")] }
    })
    .await;

    session.factory.report_connected(&healthy).await;
    session
        .wait_for_event(
            |evt| matches!(evt, SessionEvent::PeerConnected { peer_id } if *peer_id == healthy),
        )
        .await;
}

#[tokio::test]
async fn failed_answer_application_closes_the_initiator_entry() {
    init_tracing();

    let mut session = start_session("room-42").await;
    let remote = PeerId::new();

    session.relay(SignalMessage::Roster(vec![remote.clone()])).await;
    assert!(matches!(
        recv_outbound(&mut session.outbound).await,
        SignalMessage::SendSignal { .. }
    ));

    session.factory.driver_for(&remote).await.fail_apply();
    session
        .relay(SignalMessage::SignalReturned {
            id: remote.clone(),
            signal: SignalPayload::from("ANSWER"),
        })
        .await;

    session
        .wait_for_event(
            |evt| matches!(evt, SessionEvent::PeerClosed { peer_id } if *peer_id == remote),
        )
        .await;
    session
        .wait_for_event(|evt| matches!(evt, SessionEvent::RosterSize(0)))
        .await;
    assert!(session.factory.driver_for(&remote).await.is_closed());
}
