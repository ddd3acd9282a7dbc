//! Process-wide table of live rooms.
//!
//! Rooms are stored behind their own `tokio::sync::Mutex` inside a sharded
//! `DashMap`, so unrelated rooms never contend. Shard guards are only ever
//! held for the duration of a map operation, never across an `.await`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use wordrush_game::{GameError, Room, RoomId};

/// Shared handle to a single room.
pub type RoomHandle = Arc<Mutex<Room>>;

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self { rooms: DashMap::new() }
    }

    /// Mints a fresh room id and stores the room built for it.
    ///
    /// Ids colliding with a live room are discarded and redrawn.
    pub fn create<F>(&self, build: F) -> Result<(RoomId, RoomHandle), GameError>
    where
        F: FnOnce(RoomId) -> Result<Room, GameError>,
    {
        let (id, entry) = self.vacant_entry();
        let handle = Arc::new(Mutex::new(build(id)?));
        entry.insert(handle.clone());
        info!("🏠 Room {} created ({} live)", id, self.rooms.len());
        Ok((id, handle))
    }

    /// Looks a room up by id.
    pub fn get(&self, id: &RoomId) -> Result<RoomHandle, GameError> {
        self.rooms
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GameError::RoomNotFound(id.to_string()))
    }

    /// Removes a room. Returns false if it was already gone.
    pub fn delete(&self, id: &RoomId) -> bool {
        let removed = self.rooms.remove(id).is_some();
        if removed {
            info!("🗑️ Room {} deleted ({} live)", id, self.rooms.len());
        }
        removed
    }

    /// Stores a replacement for `old` under a fresh id and removes `old`.
    ///
    /// The caller holds `old`'s lock and is expected to retire it, so that
    /// anyone already waiting on the old handle sees it as gone.
    pub fn replace<F>(&self, old: &RoomId, build: F) -> (RoomId, RoomHandle)
    where
        F: FnOnce(RoomId) -> Room,
    {
        let (id, entry) = self.vacant_entry();
        let handle = Arc::new(Mutex::new(build(id)));
        entry.insert(handle.clone());
        if self.rooms.remove(old).is_none() {
            warn!("⚠️ Replaced room {} was not in the registry", old);
        }
        info!("🔄 Room {} replaced by {}", old, id);
        (id, handle)
    }

    /// Copies out every live handle so callers can lock rooms without
    /// holding any shard guard.
    pub fn snapshot(&self) -> Vec<(RoomId, RoomHandle)> {
        self.rooms
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn vacant_entry(&self) -> (RoomId, dashmap::mapref::entry::VacantEntry<'_, RoomId, RoomHandle>) {
        loop {
            let id = RoomId::new();
            match self.rooms.entry(id) {
                Entry::Vacant(entry) => return (id, entry),
                Entry::Occupied(_) => debug!("Room id {} already taken, redrawing", id),
            }
        }
    }
}
