use crate::room::room_command::RoomCommand;
use crate::signaling::SignalingOutput;
use huddle_core::{PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One room's event loop. Membership is kept in insertion order and lives
/// only as long as the process; the relay never inspects signal contents.
pub struct Room {
    room_id: RoomId,
    members: Vec<PeerId>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        room_id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            room_id,
            members: Vec::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Room '{}' event loop started", self.room_id);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Room '{}' event loop finished", self.room_id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { peer_id } => {
                if self.members.contains(&peer_id) {
                    warn!(
                        "Duplicate join-room from {} in '{}', ignoring",
                        peer_id, self.room_id
                    );
                    return;
                }

                info!("{} joined room '{}'", peer_id, self.room_id);

                // The roster must reach the joiner before any peer-joined
                // naming the joiner can reach anyone else, so it is sent
                // before the membership list grows.
                self.signaling
                    .send_roster(peer_id.clone(), self.members.clone())
                    .await;
                self.members.push(peer_id);
            }

            RoomCommand::ForwardSignal {
                caller_id,
                target,
                signal,
            } => {
                if !self.members.contains(&target) {
                    warn!(
                        "send-signal from {} to unknown target {} in '{}', dropping",
                        caller_id, target, self.room_id
                    );
                    return;
                }

                self.signaling
                    .send_peer_joined(target, caller_id, signal)
                    .await;
            }

            RoomCommand::ReturnSignal {
                responder_id,
                caller_id,
                signal,
            } => {
                // The outgoing `id` names the responder, rewritten from the
                // sender of the return-signal.
                self.signaling
                    .send_signal_returned(caller_id, responder_id, signal)
                    .await;
            }

            RoomCommand::Disconnect { peer_id } => {
                let before = self.members.len();
                self.members.retain(|m| m != &peer_id);

                if self.members.len() == before {
                    return;
                }

                info!("{} left room '{}'", peer_id, self.room_id);

                for member in &self.members {
                    self.signaling
                        .send_peer_left(member.clone(), peer_id.clone())
                        .await;
                }
            }
        }
    }
}
