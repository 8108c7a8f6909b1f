//! Orchestration of room creation, deletion, listing, and joining.

use std::sync::Arc;

use uuid::Uuid;

use super::{
    error::ServiceError,
    hub::{Hub, RoomSummary},
    room::{MemberInfo, Room, RoomHandle},
};

/// Minimum length of a room name, in characters.
pub const MIN_ROOM_NAME_LEN: usize = 3;

/// Request-facing operations on the hub and its rooms. Cheap to clone; all
/// state lives behind the shared hub.
#[derive(Clone)]
pub struct RoomService {
    hub: Arc<Hub>,
}

impl RoomService {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// Create a room: validate the name, allocate an identifier, start the
    /// event loop, and register it in the hub.
    pub async fn create_room(&self, name: &str) -> Result<RoomSummary, ServiceError> {
        let name = name.trim();
        if name.chars().count() < MIN_ROOM_NAME_LEN {
            return Err(ServiceError::Validation(format!(
                "room name must be at least {MIN_ROOM_NAME_LEN} characters"
            )));
        }

        let id = Uuid::new_v4().to_string();
        let handle = Room::spawn(&id, name);
        let summary = RoomSummary {
            id: id.clone(),
            name: name.to_string(),
            created_at: handle.created_at,
        };
        if let Err(rejected) = self.hub.insert(handle).await {
            // v4 identifiers should never collide; if one somehow does, stop
            // the loop we just started and surface the conflict.
            rejected.shutdown();
            return Err(ServiceError::RoomConflict(id));
        }

        tracing::info!(room_id = %id, room_name = %name, "room created");
        Ok(summary)
    }

    /// Delete a room: remove it from the hub, then signal its event loop to
    /// exit. Loop exit closes every member queue, so attached connections
    /// tear down as well.
    pub async fn delete_room(&self, id: &str) -> Result<(), ServiceError> {
        match self.hub.remove(id).await {
            Some(handle) => {
                handle.shutdown();
                tracing::info!(room_id = %id, "room deleted");
                Ok(())
            }
            None => Err(ServiceError::RoomNotFound(id.to_string())),
        }
    }

    /// Snapshot of all rooms.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.hub.list().await
    }

    /// Snapshot of one room's membership.
    pub async fn list_members(&self, room_id: &str) -> Result<Vec<MemberInfo>, ServiceError> {
        let room = self
            .hub
            .get(room_id)
            .await
            .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
        Ok(room.members().await?)
    }

    /// Validate a join request and resolve the target room. No state is
    /// mutated here: registration happens once the caller has an upgraded
    /// connection to bridge in.
    pub async fn join_room(
        &self,
        room_id: &str,
        member_id: &str,
        username: &str,
    ) -> Result<RoomHandle, ServiceError> {
        if member_id.trim().is_empty() {
            return Err(ServiceError::Validation("userId is required".to_string()));
        }
        if username.trim().is_empty() {
            return Err(ServiceError::Validation("username is required".to_string()));
        }
        self.hub
            .get(room_id)
            .await
            .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
    }
}
