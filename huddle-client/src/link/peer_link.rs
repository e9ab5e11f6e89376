use crate::error::NegotiationError;
use crate::link::driver::{LinkDriver, LinkEvent};
use huddle_core::{PeerId, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Which side of the negotiation this link took. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Created,
    AwaitingLocalDescriptor,
    SignalExchanged,
    Connected,
    Closed,
}

/// One peer connection to one remote participant, as a state machine driven
/// by the session loop. All driver work runs on a spawned negotiation task
/// that reports back through the shared link event stream; the session is
/// never blocked by a slow negotiation.
pub struct PeerLink {
    peer_id: PeerId,
    role: Role,
    state: LinkState,
    driver: Arc<dyn LinkDriver>,
    events: mpsc::Sender<LinkEvent>,
    negotiation: Option<JoinHandle<()>>,
}

impl PeerLink {
    fn new(
        peer_id: PeerId,
        role: Role,
        driver: Arc<dyn LinkDriver>,
        events: mpsc::Sender<LinkEvent>,
    ) -> Self {
        Self {
            peer_id,
            role,
            state: LinkState::Created,
            driver,
            events,
            negotiation: None,
        }
    }

    /// Open a link that begins negotiation unprompted: it creates the offer
    /// and raises `SignalReady` exactly once when the descriptor is final.
    pub fn initiate(
        peer_id: PeerId,
        driver: Arc<dyn LinkDriver>,
        events: mpsc::Sender<LinkEvent>,
    ) -> Self {
        let mut link = Self::new(peer_id, Role::Initiator, driver, events);

        link.negotiation = Some(tokio::spawn({
            let driver = link.driver.clone();
            let events = link.events.clone();
            let peer_id = link.peer_id.clone();

            async move {
                match driver.create_offer().await {
                    Ok(signal) => {
                        let _ = events.send(LinkEvent::SignalReady { peer_id, signal }).await;
                    }
                    Err(e) => {
                        warn!("Offer negotiation failed for {}: {}", peer_id, e);
                        let _ = events.send(LinkEvent::Closed { peer_id }).await;
                    }
                }
            }
        }));
        link.state = LinkState::AwaitingLocalDescriptor;

        link
    }

    /// Open a link that already holds the remote party's offer: it applies
    /// the offer immediately, then raises `SignalReady` with its answer.
    pub fn respond(
        peer_id: PeerId,
        driver: Arc<dyn LinkDriver>,
        incoming: SignalPayload,
        events: mpsc::Sender<LinkEvent>,
    ) -> Self {
        let mut link = Self::new(peer_id, Role::Responder, driver, events);

        link.negotiation = Some(tokio::spawn({
            let driver = link.driver.clone();
            let events = link.events.clone();
            let peer_id = link.peer_id.clone();

            async move {
                let answer = async {
                    driver.apply_remote(&incoming).await?;
                    driver.create_answer().await
                }
                .await;

                match answer {
                    Ok(signal) => {
                        let _ = events.send(LinkEvent::SignalReady { peer_id, signal }).await;
                    }
                    Err(e) => {
                        warn!("Answer negotiation failed for {}: {}", peer_id, e);
                        let _ = events.send(LinkEvent::Closed { peer_id }).await;
                    }
                }
            }
        }));
        link.state = LinkState::AwaitingLocalDescriptor;

        link
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Record that this link's descriptor went out through the channel.
    pub fn mark_signal_sent(&mut self) {
        if self.state == LinkState::AwaitingLocalDescriptor {
            self.state = LinkState::SignalExchanged;
        }
    }

    /// Record that the underlying connection reached its connected state.
    pub fn mark_connected(&mut self) {
        if self.state != LinkState::Closed {
            self.state = LinkState::Connected;
        }
    }

    /// Feed a returned remote descriptor into this link. Only an initiator
    /// that has already sent its own signal may accept one.
    pub fn apply_remote_signal(&self, signal: SignalPayload) -> Result<(), NegotiationError> {
        if self.role != Role::Initiator || self.state != LinkState::SignalExchanged {
            return Err(NegotiationError::InvalidState);
        }

        tokio::spawn({
            let driver = self.driver.clone();
            let events = self.events.clone();
            let peer_id = self.peer_id.clone();

            async move {
                if let Err(e) = driver.apply_remote(&signal).await {
                    warn!("Failed to apply returned signal from {}: {}", peer_id, e);
                    let _ = events.send(LinkEvent::Closed { peer_id }).await;
                }
            }
        });

        Ok(())
    }

    /// Terminal transition, reachable from any state. Aborts a still-running
    /// negotiation and closes the underlying connection.
    pub async fn close(&mut self) {
        if self.state == LinkState::Closed {
            return;
        }
        self.state = LinkState::Closed;

        if let Some(task) = self.negotiation.take() {
            task.abort();
        }
        self.driver.close().await;
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        // close() cannot run here; the driver is shut down when its Arcs
        // unwind. The negotiation task must not outlive the link though.
        if let Some(task) = self.negotiation.take() {
            task.abort();
        }
    }
}
