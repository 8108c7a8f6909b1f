//! Shared application state.

use std::sync::Arc;

use super::{hub::Hub, service::RoomService};

/// State shared by every handler: the orchestration service over the
/// process-wide hub.
pub struct AppState {
    pub service: RoomService,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            service: RoomService::new(Arc::new(Hub::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
