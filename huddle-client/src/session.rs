use crate::channel::{ChannelEvent, SignalingChannel, WsChannel};
use crate::error::SessionError;
use crate::link::{LinkEvent, LinkFactory, PeerLink, Role};
use crate::media::{LocalAudio, MediaSource, RemoteAudio};
use crate::registry::{PeerEntry, PeerRegistry};
use huddle_core::{PeerId, RoomId, SignalMessage, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the embedding UI observes from a session: remote audio per peer and
/// a roster-size signal for display.
pub enum SessionEvent {
    RemoteAudio { peer_id: PeerId, track: RemoteAudio },
    PeerConnected { peer_id: PeerId },
    PeerClosed { peer_id: PeerId },
    RosterSize(usize),
    Ended,
}

enum SessionCommand {
    Leave,
}

/// Owner handle for a running session.
pub struct SessionHandle {
    local_id: PeerId,
    command_tx: mpsc::Sender<SessionCommand>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    /// User-initiated exit: tears down every peer link, then resolves once
    /// the session loop has finished.
    pub async fn leave(self) {
        let _ = self.command_tx.send(SessionCommand::Leave).await;
        let _ = self.task.await;
    }
}

/// Orchestrates one participant's presence in one room: reacts to roster and
/// relay events, drives the peer registry, forwards outbound signaling.
/// Single logical thread of control; every handler runs to completion before
/// the next event is taken.
pub struct RoomSession {
    local_id: PeerId,
    room_id: RoomId,
    registry: PeerRegistry,
    channel: Arc<dyn SignalingChannel>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    link_tx: mpsc::Sender<LinkEvent>,
    link_rx: mpsc::Receiver<LinkEvent>,
    factory: Arc<dyn LinkFactory>,
    local_audio: LocalAudio,
    events_tx: mpsc::Sender<SessionEvent>,
    command_rx: mpsc::Receiver<SessionCommand>,
}

impl RoomSession {
    /// Connect to a relay over WebSocket and join `room_id` there. Local
    /// audio is acquired first; a session without media never opens a
    /// relay connection.
    pub async fn connect(
        url: &str,
        room_id: RoomId,
        media: Arc<dyn MediaSource>,
        factory: Arc<dyn LinkFactory>,
    ) -> Result<(SessionHandle, mpsc::Receiver<SessionEvent>), SessionError> {
        let local_audio = media.acquire_local_audio().await?;
        let (channel, channel_rx) = WsChannel::connect(url).await?;
        Self::start(room_id, local_audio, Arc::new(channel), channel_rx, factory).await
    }

    /// Join a room over an already established signaling channel: acquire
    /// local audio, wait for the relay-assigned identifier, announce the
    /// join, then start the event loop.
    pub async fn join(
        room_id: RoomId,
        media: Arc<dyn MediaSource>,
        channel: Arc<dyn SignalingChannel>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        factory: Arc<dyn LinkFactory>,
    ) -> Result<(SessionHandle, mpsc::Receiver<SessionEvent>), SessionError> {
        // Media failure aborts the join before anything touches the relay.
        let local_audio = media.acquire_local_audio().await?;
        Self::start(room_id, local_audio, channel, channel_rx, factory).await
    }

    async fn start(
        room_id: RoomId,
        local_audio: LocalAudio,
        channel: Arc<dyn SignalingChannel>,
        mut channel_rx: mpsc::Receiver<ChannelEvent>,
        factory: Arc<dyn LinkFactory>,
    ) -> Result<(SessionHandle, mpsc::Receiver<SessionEvent>), SessionError> {
        let local_id = loop {
            match channel_rx.recv().await {
                Some(ChannelEvent::Message(SignalMessage::Welcome { id })) => break id,
                Some(ChannelEvent::Message(other)) => {
                    debug!("Ignoring pre-welcome message: {:?}", other);
                }
                Some(ChannelEvent::Closed) | None => return Err(SessionError::NoWelcome),
            }
        };

        channel
            .send(SignalMessage::JoinRoom {
                room_id: room_id.clone(),
            })
            .await?;

        let (events_tx, events_rx) = mpsc::channel(64);
        let (command_tx, command_rx) = mpsc::channel(8);
        let (link_tx, link_rx) = mpsc::channel(256);

        let session = Self {
            local_id: local_id.clone(),
            room_id,
            registry: PeerRegistry::new(),
            channel,
            channel_rx,
            link_tx,
            link_rx,
            factory,
            local_audio,
            events_tx,
            command_rx,
        };

        let task = tokio::spawn(session.run());

        Ok((
            SessionHandle {
                local_id,
                command_tx,
                task,
            },
            events_rx,
        ))
    }

    async fn run(mut self) {
        info!("Session {} active in room '{}'", self.local_id, self.room_id);

        loop {
            tokio::select! {
                evt = self.channel_rx.recv() => {
                    match evt {
                        Some(ChannelEvent::Message(msg)) => self.handle_relay_message(msg).await,
                        Some(ChannelEvent::Closed) | None => {
                            warn!("Signaling channel closed, tearing down session {}", self.local_id);
                            self.teardown().await;
                            break;
                        }
                    }
                }

                evt = self.link_rx.recv() => {
                    // The session holds its own sender, so this channel
                    // cannot close while the loop runs.
                    if let Some(e) = evt {
                        self.handle_link_event(e).await;
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Leave) | None => {
                            info!("Session {} leaving room '{}'", self.local_id, self.room_id);
                            self.teardown().await;
                            break;
                        }
                    }
                }
            }
        }

        info!("Session {} finished", self.local_id);
    }

    async fn handle_relay_message(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Roster(members) => {
                for peer_id in members {
                    if peer_id == self.local_id {
                        continue;
                    }
                    // A repeated roster, or one arriving after peer-joined
                    // events, must not recreate live entries.
                    if self.registry.contains(&peer_id) {
                        debug!("Roster repeat for {}, already registered", peer_id);
                        continue;
                    }
                    self.open_initiator(peer_id).await;
                }
                self.emit_roster_size().await;
            }

            SignalMessage::PeerJoined { caller_id, signal } => {
                if self.registry.contains(&caller_id) {
                    warn!("Duplicate peer-joined for {}, ignoring", caller_id);
                    return;
                }
                self.open_responder(caller_id, signal).await;
                self.emit_roster_size().await;
            }

            SignalMessage::SignalReturned { id, signal } => {
                let Some(entry) = self.registry.get(&id) else {
                    warn!("signal-returned for unknown peer {}, ignoring", id);
                    return;
                };
                if let Err(e) = entry.link.apply_remote_signal(signal) {
                    warn!("Cannot apply returned signal from {}: {}", id, e);
                }
            }

            SignalMessage::PeerLeft { id } => {
                self.close_peer(&id).await;
            }

            other => {
                debug!("Ignoring relay message: {:?}", other);
            }
        }
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::SignalReady { peer_id, signal } => {
                let Some(entry) = self.registry.get_mut(&peer_id) else {
                    debug!("Signal ready for removed peer {}, dropping", peer_id);
                    return;
                };
                entry.link.mark_signal_sent();

                let msg = match entry.role {
                    Role::Initiator => SignalMessage::SendSignal {
                        user_to_signal: peer_id.clone(),
                        caller_id: self.local_id.clone(),
                        signal,
                    },
                    Role::Responder => SignalMessage::ReturnSignal {
                        caller_id: peer_id.clone(),
                        signal,
                    },
                };

                if let Err(e) = self.channel.send(msg).await {
                    warn!("Failed to send signal for {}: {}", peer_id, e);
                }
            }

            LinkEvent::Connected { peer_id } => {
                if let Some(entry) = self.registry.get_mut(&peer_id) {
                    entry.link.mark_connected();
                    let _ = self
                        .events_tx
                        .send(SessionEvent::PeerConnected { peer_id })
                        .await;
                }
            }

            LinkEvent::RemoteTrack { peer_id, track } => {
                let _ = self
                    .events_tx
                    .send(SessionEvent::RemoteAudio { peer_id, track })
                    .await;
            }

            LinkEvent::Closed { peer_id } => {
                self.close_peer(&peer_id).await;
            }
        }
    }

    async fn open_initiator(&mut self, peer_id: PeerId) {
        match self
            .factory
            .create(peer_id.clone(), self.local_audio.clone(), self.link_tx.clone())
            .await
        {
            Ok(driver) => {
                let link = PeerLink::initiate(peer_id, driver, self.link_tx.clone());
                if let Err(e) = self.registry.insert(PeerEntry::new(link)) {
                    warn!("Dropping freshly opened link: {}", e);
                }
            }
            Err(e) => warn!("Failed to open initiator link to {}: {}", peer_id, e),
        }
    }

    async fn open_responder(&mut self, peer_id: PeerId, incoming: SignalPayload) {
        match self
            .factory
            .create(peer_id.clone(), self.local_audio.clone(), self.link_tx.clone())
            .await
        {
            Ok(driver) => {
                let link = PeerLink::respond(peer_id, driver, incoming, self.link_tx.clone());
                if let Err(e) = self.registry.insert(PeerEntry::new(link)) {
                    warn!("Dropping freshly opened link: {}", e);
                }
            }
            Err(e) => warn!("Failed to open responder link to {}: {}", peer_id, e),
        }
    }

    async fn close_peer(&mut self, peer_id: &PeerId) {
        let Some(mut entry) = self.registry.remove(peer_id) else {
            return;
        };
        entry.link.close().await;

        let _ = self
            .events_tx
            .send(SessionEvent::PeerClosed {
                peer_id: peer_id.clone(),
            })
            .await;
        self.emit_roster_size().await;
    }

    /// Close every owned link and the channel. No link may keep consuming
    /// the shared local stream once the session is gone.
    async fn teardown(&mut self) {
        for mut entry in self.registry.drain() {
            entry.link.close().await;
        }
        self.channel.close().await;
        let _ = self.events_tx.send(SessionEvent::Ended).await;
    }

    async fn emit_roster_size(&self) {
        let _ = self
            .events_tx
            .send(SessionEvent::RosterSize(self.registry.len()))
            .await;
    }
}
