use async_trait::async_trait;
use huddle_client::{ChannelError, SignalingChannel};
use huddle_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Captures everything the session sends toward the relay.
pub struct MockChannel {
    tx: mpsc::UnboundedSender<SignalMessage>,
    closed: AtomicBool,
}

impl MockChannel {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SignalMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                closed: AtomicBool::new(false),
            }),
            rx,
        )
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingChannel for MockChannel {
    async fn send(&self, msg: SignalMessage) -> Result<(), ChannelError> {
        self.tx.send(msg).map_err(|_| ChannelError::Closed)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Receive the next outbound message or panic after a short timeout.
pub async fn recv_outbound(rx: &mut mpsc::UnboundedReceiver<SignalMessage>) -> SignalMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an outbound message")
        .expect("outbound channel closed")
}

/// Assert that no further outbound message arrives within a grace period.
pub async fn assert_no_outbound(rx: &mut mpsc::UnboundedReceiver<SignalMessage>) {
    let res = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(res.is_err(), "unexpected outbound message: {:?}", res);
}
