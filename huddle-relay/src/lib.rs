pub mod room;
pub mod signaling;

pub use room::*;
pub use signaling::*;

use std::sync::Arc;

/// Shared state handed to the axum router.
pub struct AppState {
    pub service: SignalingService,
    pub rooms: RoomManager,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let service = SignalingService::new();
        let rooms = RoomManager::new(Arc::new(service.clone()));
        Arc::new(Self { service, rooms })
    }
}
