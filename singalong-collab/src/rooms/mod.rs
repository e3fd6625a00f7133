mod broadcast;
mod chat;
mod members;
mod playback;
mod queue;
mod room;

use std::{sync::Arc, time::Duration};

use dashmap::mapref::entry::Entry;
use log::info;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    util::{now, random_code},
    CollabContext, ConnectionId, Timestamp,
};

pub use broadcast::*;
pub use chat::*;
pub use members::*;
pub use playback::*;
pub use queue::*;
pub use room::*;

/// Owns every room, and routes room events to them.
///
/// Events for rooms that don't exist, or from users that aren't members, are dropped
/// with an error that callers are free to ignore.
pub struct RoomManager {
    context: CollabContext,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room does not exist")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("User is not a member of this room")]
    NotAMember,
    #[error("There is no song at that position in the queue")]
    InvalidIndex,
    #[error("Nothing is playing")]
    NothingPlaying,
    #[error("Message is empty")]
    EmptyMessage,
}

impl RoomManager {
    pub fn new(context: &CollabContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Returns the room with the given id, creating it with default settings if it doesn't exist.
    pub fn get_or_create(&self, id: &str) -> Arc<Room> {
        let id = normalize_room_id(id);

        self.context
            .rooms
            .entry(id.clone())
            .or_insert_with(|| {
                info!("Auto-created room {}", id);
                self.new_room(id.clone(), None, Visibility::Public)
            })
            .value()
            .clone()
    }

    /// Creates a room with a newly generated id
    pub fn create_room(&self, name: Option<String>, visibility: Visibility) -> Arc<Room> {
        loop {
            let id = random_code(self.context.config.room_id_length);

            if let Entry::Vacant(entry) = self.context.rooms.entry(id.clone()) {
                let room = self.new_room(id, name, visibility);
                info!("Created room {}", room.id());

                entry.insert(room.clone());
                return room;
            }
        }
    }

    /// Returns the room if it exists
    pub fn room_by_id(&self, id: &str) -> Result<Arc<Room>, RoomError> {
        self.context
            .rooms
            .get(&normalize_room_id(id))
            .map(|r| r.value().clone())
            .ok_or(RoomError::RoomNotFound)
    }

    /// Deletes a room. Does nothing if it doesn't exist.
    pub fn delete(&self, id: &str) {
        if let Ok(room) = self.room_by_id(id) {
            info!("Deleting room {}", room.id());
            room.close();
        }
    }

    /// Returns all public rooms, the most populated first.
    pub fn list_public(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<_> = self
            .list_all()
            .into_iter()
            .filter_map(|r| r.public_summary())
            .collect();

        summaries.sort_by(|a, b| b.member_count.cmp(&a.member_count));
        summaries
    }

    /// Get all rooms in memory
    pub fn list_all(&self) -> Vec<Arc<Room>> {
        // Collected before locking any room, the map must not be held while a room is locked
        self.context.rooms.iter().map(|r| r.value().clone()).collect()
    }

    /// Deletes every empty auto delete room that has been inactive for longer than the threshold.
    /// Returns how many rooms were deleted.
    pub fn sweep_idle(&self, now: Timestamp, threshold: Duration) -> usize {
        let threshold_in_millis = threshold.as_millis() as i64;

        self.list_all()
            .into_iter()
            .filter(|r| r.close_if_idle(now, threshold_in_millis))
            .count()
    }

    /// Runs the idle sweep on the configured interval, forever.
    pub async fn run_idle_sweep(&self) {
        let mut ticker = interval(self.context.config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let deleted = self.sweep_idle(now(), self.context.config.idle_threshold);

            if deleted > 0 {
                info!("Idle sweep deleted {} room(s)", deleted);
            }
        }
    }

    /// Joins a room, creating it if it doesn't exist.
    pub fn join(
        &self,
        room_id: &str,
        user_id: &str,
        user_name: &str,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, RoomError> {
        loop {
            let room = self.get_or_create(room_id);

            match room.join(user_id, user_name, connection) {
                // The room was vacated between lookup and join, so a new one is created
                Err(RoomError::RoomNotFound) => continue,
                result => return result,
            }
        }
    }

    pub fn leave(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.leave(user_id)
    }

    /// Removes the members using a connection that dropped, from every room.
    pub fn disconnect(&self, connection: ConnectionId) -> usize {
        self.list_all()
            .into_iter()
            .map(|r| r.disconnect(connection))
            .sum()
    }

    pub fn enqueue(
        &self,
        room_id: &str,
        user_id: &str,
        request: SongRequest,
        priority: Priority,
    ) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.enqueue(user_id, request, priority)
    }

    pub fn remove(&self, room_id: &str, user_id: &str, index: usize) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.remove(user_id, index)
    }

    pub fn promote(&self, room_id: &str, user_id: &str, index: usize) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.promote(user_id, index)
    }

    pub fn advance(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.advance(user_id)
    }

    pub fn relay(
        &self,
        room_id: &str,
        user_id: &str,
        origin: ConnectionId,
        control: TransientControl,
    ) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.relay(user_id, origin, control)
    }

    pub fn chat(&self, room_id: &str, user_id: &str, message: &str) -> Result<(), RoomError> {
        self.room_by_id(room_id)?.chat(user_id, message)
    }

    fn new_room(&self, id: RoomId, name: Option<String>, visibility: Visibility) -> Arc<Room> {
        let data = RoomData::new(id, name, visibility, &self.context.config, now());
        Room::new(&self.context, data)
    }
}
