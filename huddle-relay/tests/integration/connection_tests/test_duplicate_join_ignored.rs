use huddle_core::PeerId;
use huddle_relay::RoomCommand;

use crate::utils::{CapturedSignal, assert_no_signal, recv_signal};
use crate::{create_test_room, init_tracing};

#[tokio::test]
async fn second_join_from_same_peer_is_ignored() {
    init_tracing();

    let (cmd_tx, mut signal_rx, signaling) = create_test_room();
    let peer = PeerId::new();

    cmd_tx
        .send(RoomCommand::Join {
            peer_id: peer.clone(),
        })
        .await
        .unwrap();
    assert!(matches!(
        recv_signal(&mut signal_rx).await,
        CapturedSignal::Roster { .. }
    ));

    cmd_tx
        .send(RoomCommand::Join {
            peer_id: peer.clone(),
        })
        .await
        .unwrap();

    // No second roster, no membership mutation visible to later joiners.
    assert_no_signal(&mut signal_rx).await;

    let other = PeerId::new();
    cmd_tx
        .send(RoomCommand::Join {
            peer_id: other.clone(),
        })
        .await
        .unwrap();

    match recv_signal(&mut signal_rx).await {
        CapturedSignal::Roster { peer_id, members } => {
            assert_eq!(peer_id, other);
            assert_eq!(members, vec![peer]);
        }
        got => panic!("expected roster, got {:?}", got),
    }

    assert_eq!(signaling.delivery_count().await, 2);
}
