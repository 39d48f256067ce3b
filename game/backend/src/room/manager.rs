//! Registry of live game rooms, one per connected player.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use ulid::Ulid;

use crate::game::RoundSnapshot;

/// Short room id: the last 10 characters of a ULID, which come from its
/// random part. The leading characters only encode the millisecond.
pub fn new_room_id() -> String {
    let ulid = Ulid::new().to_string();
    ulid[ulid.len() - 10..].to_string()
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub created_at: SystemTime,
    snapshot: watch::Receiver<RoundSnapshot>,
}

impl Room {
    pub fn snapshot(&self) -> RoundSnapshot { self.snapshot.borrow().clone() }

    /// The controller feeding this room has stopped without the room being closed.
    fn is_orphaned(&self) -> bool { self.snapshot.has_changed().is_err() }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,
}

#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: DashMap<String, Room>,
}

impl RoomManager {
    pub fn new() -> Self { Self { rooms: DashMap::new() } }

    /// Registers a controller's snapshot feed under a fresh id. An id already
    /// in use is never overwritten; another one is drawn instead.
    pub fn open(&self, snapshot: watch::Receiver<RoundSnapshot>) -> String {
        loop {
            let id = new_room_id();
            if let Entry::Vacant(slot) = self.rooms.entry(id.clone()) {
                slot.insert(Room { id: id.clone(), created_at: SystemTime::now(), snapshot });
                return id;
            }
        }
    }

    pub fn close(&self, id: &str) -> Result<(), RoomError> {
        self.rooms.remove(id).map(|_| ()).ok_or(RoomError::NotFound)
    }

    pub fn snapshot(&self, id: &str) -> Result<RoundSnapshot, RoomError> {
        self.rooms.get(id).map(|r| r.snapshot()).ok_or(RoomError::NotFound)
    }

    /// Drops rooms older than `max_age` whose controller has stopped. Rooms of
    /// a live connection are kept whatever their round status.
    pub fn prune_orphaned(&self, max_age: Duration) -> usize {
        let now = SystemTime::now();
        let before = self.rooms.len();
        self.rooms.retain(|_, r| {
            let age = now.duration_since(r.created_at).unwrap_or_default();
            age < max_age || !r.is_orphaned()
        });
        before - self.rooms.len()
    }
}
