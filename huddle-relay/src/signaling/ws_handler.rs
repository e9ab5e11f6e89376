use crate::{AppState, RoomCommand};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{PeerId, SignalMessage};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Identifier is assigned per connected session, never taken from the
    // client.
    let peer_id = PeerId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, state))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, state: Arc<AppState>) {
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.service.add_peer(peer_id.clone(), tx);
    state
        .service
        .send_message(&peer_id, SignalMessage::Welcome {
            id: peer_id.clone(),
        });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Set once the participant has joined; all later traffic for this
    // connection routes to that room. Shared with the receive loop so the
    // disconnect below still reaches the room when the send side dies
    // first and the loop is aborted mid-read.
    let joined_room: Arc<Mutex<Option<mpsc::Sender<RoomCommand>>>> = Arc::new(Mutex::new(None));

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let peer_id = peer_id.clone();
        let joined_room = joined_room.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(signal) => {
                            handle_signal(&state, &peer_id, &joined_room, signal).await;
                        }
                        Err(e) => warn!("Invalid SignalMessage from {}: {:?}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    if let Some(tx) = joined_room.lock().await.take() {
        let _ = tx
            .send(RoomCommand::Disconnect {
                peer_id: peer_id.clone(),
            })
            .await;
    }

    state.service.remove_peer(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}

async fn handle_signal(
    state: &Arc<AppState>,
    peer_id: &PeerId,
    joined_room: &Mutex<Option<mpsc::Sender<RoomCommand>>>,
    signal: SignalMessage,
) {
    match signal {
        SignalMessage::JoinRoom { room_id } => {
            let mut slot = joined_room.lock().await;
            if slot.is_some() {
                warn!("{} sent join-room twice on one connection", peer_id);
                return;
            }

            let tx = state.rooms.get_room_sender(&room_id);
            let _ = tx
                .send(RoomCommand::Join {
                    peer_id: peer_id.clone(),
                })
                .await;
            *slot = Some(tx);
        }

        SignalMessage::SendSignal {
            user_to_signal,
            caller_id,
            signal,
        } => {
            let Some(tx) = joined_room.lock().await.clone() else {
                warn!("send-signal from {} before join-room", peer_id);
                return;
            };
            let _ = tx
                .send(RoomCommand::ForwardSignal {
                    caller_id,
                    target: user_to_signal,
                    signal,
                })
                .await;
        }

        SignalMessage::ReturnSignal { caller_id, signal } => {
            let Some(tx) = joined_room.lock().await.clone() else {
                warn!("return-signal from {} before join-room", peer_id);
                return;
            };
            let _ = tx
                .send(RoomCommand::ReturnSignal {
                    responder_id: peer_id.clone(),
                    caller_id,
                    signal,
                })
                .await;
        }

        other => {
            warn!("Unexpected message from {}: {:?}", peer_id, other);
        }
    }
}
