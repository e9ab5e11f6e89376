use huddle_core::{PeerId, SignalMessage, SignalPayload};
use std::collections::HashSet;

use crate::init_tracing;
use crate::utils::{assert_no_outbound, recv_outbound, start_session};

#[tokio::test]
async fn roster_of_k_creates_k_initiators_with_one_signal_each() {
    init_tracing();

    let mut session = start_session("room-42").await;
    let roster: Vec<PeerId> = (0..3).map(|_| PeerId::new()).collect();

    session
        .relay(SignalMessage::Roster(roster.clone()))
        .await;

    // One send-signal per roster member, each addressed to a distinct id,
    // each naming the local session as caller.
    let mut targets = HashSet::new();
    for _ in 0..roster.len() {
        match recv_outbound(&mut session.outbound).await {
            SignalMessage::SendSignal {
                user_to_signal,
                caller_id,
                signal,
            } => {
                assert_eq!(caller_id, session.local_id);
                assert_eq!(signal, SignalPayload::from("OFFER"));
                assert!(targets.insert(user_to_signal));
            }
            other => panic!("expected send-signal, got {:?}", other),
        }
    }
    assert_eq!(targets, roster.iter().cloned().collect::<HashSet<_>>());
    assert_no_outbound(&mut session.outbound).await;

    assert_eq!(session.factory.created_count().await, roster.len());
}

#[tokio::test]
async fn own_id_in_roster_is_skipped() {
    init_tracing();

    let mut session = start_session("room-42").await;
    let other = PeerId::new();

    session
        .relay(SignalMessage::Roster(vec![
            session.local_id.clone(),
            other.clone(),
        ]))
        .await;

    match recv_outbound(&mut session.outbound).await {
        SignalMessage::SendSignal { user_to_signal, .. } => {
            assert_eq!(user_to_signal, other);
        }
        got => panic!("expected send-signal, got {:?}", got),
    }
    assert_no_outbound(&mut session.outbound).await;
    assert_eq!(session.factory.created_count().await, 1);
}

#[tokio::test]
async fn repeated_roster_never_duplicates_entries() {
    init_tracing();

    let mut session = start_session("room-42").await;
    let roster: Vec<PeerId> = (0..2).map(|_| PeerId::new()).collect();

    session.relay(SignalMessage::Roster(roster.clone())).await;
    for _ in 0..roster.len() {
        assert!(matches!(
            recv_outbound(&mut session.outbound).await,
            SignalMessage::SendSignal { .. }
        ));
    }

    session.relay(SignalMessage::Roster(roster.clone())).await;

    assert_no_outbound(&mut session.outbound).await;
    assert_eq!(session.factory.created_count().await, roster.len());
}
