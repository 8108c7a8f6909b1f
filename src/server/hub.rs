//! Process-wide registry of active rooms.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::room::RoomHandle;

/// Listing entry for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

/// Map from room identifier to the handle of its running event loop.
///
/// The map is shared by every orchestration call, so access goes through a
/// mutex scoped tightly around the map operations; the room loops themselves
/// are reached only through their handles, never through this lock.
#[derive(Default)]
pub struct Hub {
    rooms: Mutex<HashMap<String, RoomHandle>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new room. Fails if the identifier is already taken; the
    /// existing room is left untouched.
    pub async fn insert(&self, handle: RoomHandle) -> Result<(), RoomHandle> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&handle.id) {
            return Err(handle);
        }
        rooms.insert(handle.id.clone(), handle);
        Ok(())
    }

    /// Look up a room by identifier.
    pub async fn get(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.lock().await.get(id).cloned()
    }

    /// Remove a room from the registry, returning its handle so the caller
    /// can stop the event loop. The identifier is free for reuse as soon as
    /// the entry is gone.
    pub async fn remove(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.lock().await.remove(id)
    }

    /// Snapshot of all registered rooms, in no particular order.
    pub async fn list(&self) -> Vec<RoomSummary> {
        self.rooms
            .lock()
            .await
            .values()
            .map(|handle| RoomSummary {
                id: handle.id.clone(),
                name: handle.name.clone(),
                created_at: handle.created_at,
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::room::Room;

    #[tokio::test]
    async fn test_insert_and_get() {
        // given:
        let hub = Hub::new();
        hub.insert(Room::spawn("r1", "general")).await.unwrap();

        // when / then:
        let found = hub.get("r1").await.unwrap();
        assert_eq!(found.id, "r1");
        assert_eq!(found.name, "general");
        assert!(hub.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_conflict_keeps_existing_room() {
        // given:
        let hub = Hub::new();
        hub.insert(Room::spawn("r1", "general")).await.unwrap();

        // when: a second room claims the same identifier
        let rejected = hub.insert(Room::spawn("r1", "impostor")).await;

        // then: the insert fails and the original survives
        assert!(rejected.is_err());
        assert_eq!(hub.get("r1").await.unwrap().name, "general");
        assert_eq!(hub.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_frees_identifier_for_reuse() {
        // given:
        let hub = Hub::new();
        hub.insert(Room::spawn("r1", "general")).await.unwrap();

        // when:
        let removed = hub.remove("r1").await;

        // then:
        assert!(removed.is_some());
        assert!(hub.remove("r1").await.is_none());
        hub.insert(Room::spawn("r1", "general again")).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_snapshots_all_rooms() {
        // given:
        let hub = Hub::new();
        assert!(hub.is_empty().await);
        hub.insert(Room::spawn("r1", "general")).await.unwrap();
        hub.insert(Room::spawn("r2", "random")).await.unwrap();

        // when:
        let mut listed = hub.list().await;
        listed.sort_by(|a, b| a.id.cmp(&b.id));

        // then:
        let pairs: Vec<(&str, &str)> = listed
            .iter()
            .map(|room| (room.id.as_str(), room.name.as_str()))
            .collect();
        assert_eq!(pairs, vec![("r1", "general"), ("r2", "random")]);
        assert!(listed.iter().all(|room| room.created_at > 0));
    }
}
