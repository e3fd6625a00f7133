use std::sync::{Arc, Weak};

use log::{info, trace};
use parking_lot::{Mutex, MutexGuard};
use tokio::{runtime::Handle, time::sleep};

use crate::{
    util::now, CollabContext, CollabEvent, Config, ConnectionId, Queue, QueueEntry, SongRequest,
    Timestamp,
};

use super::{
    broadcast::fan_out, sanitize_message, ChatMessage, JoinOutcome, Member, NowPlaying,
    Priority, Recipients, RoomError, TransientControl,
};

/// The normalized identifier of a room
pub type RoomId = String;

/// Room ids longer than this are refused at the edges
pub const MAX_ROOM_ID_LENGTH: usize = 32;

/// Normalizes a room id as entered by a user
pub fn normalize_room_id(id: &str) -> RoomId {
    id.trim().to_uppercase()
}

/// Checks that a room id is usable once normalized
pub fn is_valid_room_id(id: &str) -> bool {
    let length = normalize_room_id(id).chars().count();
    (1..=MAX_ROOM_ID_LENGTH).contains(&length)
}

/// Determines if a room is listed publicly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    /// Only reachable by id
    Private,
}

#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub max_members: usize,
    /// If true, the room is deleted once the last member leaves
    pub auto_delete: bool,
    pub allow_guest_control: bool,
    pub require_approval: bool,
}

/// Counters describing the history of a room. These never affect behavior.
#[derive(Debug, Clone, Default)]
pub struct RoomStats {
    pub total_songs_played: u64,
    pub total_members_ever: u64,
    pub peak_member_count: usize,
}

/// The full state of a room
#[derive(Debug, Clone)]
pub struct RoomData {
    pub id: RoomId,
    pub name: String,
    pub visibility: Visibility,
    pub members: Vec<Member>,
    pub queue: Queue,
    pub current_song: Option<NowPlaying>,
    pub settings: RoomSettings,
    pub stats: RoomStats,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

/// A room as shown in listings
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub member_count: usize,
    pub max_members: usize,
    pub current_song: Option<NowPlaying>,
    pub created_at: Timestamp,
}

/// A singalong room, containing members, a queue, and the song currently playing.
///
/// Every mutation locks the room state, applies the change, and sends the resulting
/// events before the lock is released.
pub struct Room {
    id: RoomId,
    me: Weak<Room>,
    context: CollabContext,
    state: Mutex<RoomState>,
}

struct RoomState {
    data: RoomData,
    /// Set once the room is removed from the registry
    closed: bool,
    /// Set while an auto advance is waiting for its delay
    advance_scheduled: bool,
}

impl RoomData {
    pub fn new(
        id: RoomId,
        name: Option<String>,
        visibility: Visibility,
        config: &Config,
        now: Timestamp,
    ) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Room {id}"));

        Self {
            id,
            name,
            visibility,
            members: vec![],
            queue: Queue::default(),
            current_song: None,
            settings: RoomSettings {
                max_members: config.max_members,
                auto_delete: config.auto_delete,
                allow_guest_control: true,
                require_approval: false,
            },
            stats: RoomStats::default(),
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            member_count: self.members.len(),
            max_members: self.settings.max_members,
            current_song: self.current_song.clone(),
            created_at: self.created_at,
        }
    }

    /// Returns true if the idle sweep may delete this room
    pub fn is_idle(&self, now: Timestamp, threshold_in_millis: i64) -> bool {
        self.settings.auto_delete
            && self.members.is_empty()
            && now - self.last_active_at > threshold_in_millis
    }
}

impl Room {
    pub(super) fn new(context: &CollabContext, data: RoomData) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id: data.id.clone(),
            me: me.clone(),
            context: context.clone(),
            state: Mutex::new(RoomState {
                data,
                closed: false,
                advance_scheduled: false,
            }),
        })
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns a snapshot of the room state
    pub fn data(&self) -> RoomData {
        self.state.lock().data.clone()
    }

    /// Returns a summary of the room, if it is listed publicly
    pub fn public_summary(&self) -> Option<RoomSummary> {
        let state = self.state.lock();

        (state.data.visibility == Visibility::Public).then(|| state.data.summary())
    }

    /// Adds a member to the room, or updates the connection of a returning member.
    ///
    /// The joining connection receives the full room state, everyone else is notified.
    /// If the room is full, the connection receives an error instead.
    pub fn join(
        &self,
        user_id: &str,
        user_name: &str,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, RoomError> {
        let mut state = self.lock()?;

        let outcome = match state.data.add_member(user_id, user_name, connection, now()) {
            Ok(outcome) => outcome,
            Err(error) => {
                info!("{} could not join room {}: {}", user_name, self.id, error);

                let event = CollabEvent::Error {
                    message: format!("Cannot join room: {}", error),
                };

                self.broadcast(&state.data, event, Recipients::Only(connection));
                return Err(error);
            }
        };

        match outcome {
            JoinOutcome::Joined => info!("{} joined room {}", user_name, self.id),
            JoinOutcome::Rejoined => info!("{} rejoined room {}", user_name, self.id),
        }

        let snapshot = CollabEvent::RoomJoined {
            room: state.data.clone(),
        };

        let member = state.data.member(user_id)?;
        let notification = CollabEvent::MemberJoined {
            user_id: member.user_id.clone(),
            user_name: member.user_name.clone(),
            member_count: state.data.members.len(),
        };

        self.broadcast(&state.data, snapshot, Recipients::Only(connection));
        self.broadcast(&state.data, notification, Recipients::Except(connection));

        Ok(outcome)
    }

    /// Removes a member from the room.
    /// If this empties a room with auto delete enabled, the room is deleted.
    pub fn leave(&self, user_id: &str) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        let departed = state.data.remove_member(user_id, now());

        let event = CollabEvent::MemberLeft {
            user_id: user_id.to_string(),
            user_name: departed.as_ref().map(|m| m.user_name.clone()),
            member_count: state.data.members.len(),
        };

        self.broadcast(&state.data, event, Recipients::Everyone);

        if let Some(member) = departed {
            info!("{} left room {}", member.user_name, self.id);
            self.vacate_if_empty(&mut state);
        }

        Ok(())
    }

    /// Removes every member using the given connection, returning how many were removed.
    pub fn disconnect(&self, connection: ConnectionId) -> usize {
        let Ok(mut state) = self.lock() else {
            return 0;
        };

        let user_ids = state.data.members_on(connection);

        for user_id in &user_ids {
            let Some(member) = state.data.remove_member(user_id, now()) else {
                continue;
            };

            info!("{} disconnected from room {}", member.user_name, self.id);

            let event = CollabEvent::MemberLeft {
                user_id: member.user_id,
                user_name: Some(member.user_name),
                member_count: state.data.members.len(),
            };

            self.broadcast(&state.data, event, Recipients::Everyone);
        }

        if !user_ids.is_empty() {
            self.vacate_if_empty(&mut state);
        }

        user_ids.len()
    }

    /// Adds a song to the queue on behalf of a member
    pub fn enqueue(
        &self,
        user_id: &str,
        request: SongRequest,
        priority: Priority,
    ) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        let added_by_name = state.data.member(user_id)?.user_name.clone();

        let timestamp = now();
        let entry = QueueEntry::new(
            request,
            user_id.to_string(),
            added_by_name,
            timestamp,
            priority,
        );

        info!(
            "{} queued \"{}\" in room {} ({:?} priority)",
            entry.added_by_name, entry.title, self.id, priority
        );

        state.data.queue.push(entry);
        state.data.touch(user_id, timestamp);

        self.queue_changed(&mut state);
        Ok(())
    }

    /// Removes the song at the given index. Any member may remove any song.
    pub fn remove(&self, user_id: &str, index: usize) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        state.data.member(user_id)?;

        let removed = state
            .data
            .queue
            .remove(index)
            .ok_or(RoomError::InvalidIndex)?;

        trace!("Removed \"{}\" from room {}", removed.title, self.id);

        state.data.touch(user_id, now());
        self.queue_changed(&mut state);
        Ok(())
    }

    /// Moves the song at the given index to the head of the queue, and notifies the room in chat.
    pub fn promote(&self, user_id: &str, index: usize) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        let user_name = state.data.member(user_id)?.user_name.clone();

        let title = state
            .data
            .queue
            .promote(index)
            .map(|e| e.title.clone())
            .ok_or(RoomError::InvalidIndex)?;

        info!("{} prioritized \"{}\" in room {}", user_name, title, self.id);

        let timestamp = now();
        state.data.touch(user_id, timestamp);

        self.queue_changed(&mut state);

        let notice = ChatMessage::system(
            format!("⭐ \"{}\" was prioritized by {}", title, user_name),
            timestamp,
        );

        self.broadcast(
            &state.data,
            CollabEvent::ChatMessage(notice),
            Recipients::Everyone,
        );

        Ok(())
    }

    /// Plays the next song on behalf of a member
    pub fn advance(&self, user_id: &str) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        state.data.member(user_id)?;

        self.advance_locked(&mut state);
        Ok(())
    }

    /// Relays a playback control to every connection in the room except the one it came from.
    /// Playback state itself is never stored, each client applies it to its own player.
    pub fn relay(
        &self,
        user_id: &str,
        origin: ConnectionId,
        control: TransientControl,
    ) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        let member = state.data.member(user_id)?.clone();
        let timestamp = now();

        let event = match control {
            TransientControl::TogglePlay => CollabEvent::RemoteTogglePlay {
                user_id: member.user_id.clone(),
                user_name: member.user_name.clone(),
                timestamp,
            },
            TransientControl::Restart => {
                let song = state
                    .data
                    .current_song
                    .clone()
                    .ok_or(RoomError::NothingPlaying)?;

                CollabEvent::RestartSong {
                    song,
                    user_name: member.user_name.clone(),
                    timestamp,
                }
            }
            TransientControl::PlayerState {
                state: intent,
                current_time,
            } => CollabEvent::PlayerState {
                state: intent,
                current_time,
                user_name: member.user_name.clone(),
                timestamp,
            },
        };

        state.data.touch(user_id, timestamp);
        self.broadcast(&state.data, event, Recipients::Except(origin));

        Ok(())
    }

    /// Sends a chat message to everyone in the room, including the author
    pub fn chat(&self, user_id: &str, message: &str) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        let user_name = state.data.member(user_id)?.user_name.clone();
        let message = sanitize_message(message).ok_or(RoomError::EmptyMessage)?;

        let timestamp = now();
        let chat_message = ChatMessage {
            user_id: user_id.to_string(),
            user_name,
            message,
            timestamp,
        };

        state.data.touch(user_id, timestamp);
        self.broadcast(
            &state.data,
            CollabEvent::ChatMessage(chat_message),
            Recipients::Everyone,
        );

        Ok(())
    }

    /// Deletes the room if it has been idle past the threshold, returning true if it was deleted.
    pub(super) fn close_if_idle(&self, now: Timestamp, threshold_in_millis: i64) -> bool {
        let Ok(mut state) = self.lock() else {
            return false;
        };

        if !state.data.is_idle(now, threshold_in_millis) {
            return false;
        }

        info!("Deleting inactive room {}", self.id);
        self.close_locked(&mut state);

        true
    }

    /// Deletes the room from the registry
    pub(super) fn close(&self) {
        if let Ok(mut state) = self.lock() {
            self.close_locked(&mut state);
        }
    }

    /// Locks the room state, failing if the room was deleted in the meantime
    fn lock(&self) -> Result<MutexGuard<'_, RoomState>, RoomError> {
        let state = self.state.lock();

        if state.closed {
            return Err(RoomError::RoomNotFound);
        }

        Ok(state)
    }

    fn vacate_if_empty(&self, state: &mut RoomState) {
        if state.data.members.is_empty() && state.data.settings.auto_delete {
            info!("Room {} is empty, deleting it", self.id);
            self.close_locked(state);
        }
    }

    fn close_locked(&self, state: &mut RoomState) {
        state.closed = true;
        state.data.current_song = None;

        // Only remove the entry if it still refers to this room
        self.context
            .rooms
            .remove_if(&self.id, |_, room| std::ptr::eq(room.as_ref(), self));
    }

    fn advance_locked(&self, state: &mut RoomState) {
        let timestamp = now();
        let song = state.data.advance(timestamp).cloned();

        match &song {
            Some(playing) => info!("Playing \"{}\" in room {}", playing.entry.title, self.id),
            None => trace!("Queue of room {} is empty, stopping playback", self.id),
        }

        let has_song = song.is_some();
        self.broadcast(
            &state.data,
            CollabEvent::SongChanged { song },
            Recipients::Everyone,
        );

        if has_song {
            let queue = state.data.queue.entries();
            self.broadcast(
                &state.data,
                CollabEvent::QueueUpdated { queue },
                Recipients::Everyone,
            );
        }
    }

    /// Broadcasts the queue and starts playback if the room is idle
    fn queue_changed(&self, state: &mut RoomState) {
        let queue = state.data.queue.entries();
        self.broadcast(
            &state.data,
            CollabEvent::QueueUpdated { queue },
            Recipients::Everyone,
        );

        self.schedule_advance(state);
    }

    fn schedule_advance(&self, state: &mut RoomState) {
        if state.advance_scheduled || !state.data.needs_advance() {
            return;
        }

        // Without a runtime there is nothing to defer to
        let Ok(handle) = Handle::try_current() else {
            self.advance_locked(state);
            return;
        };

        state.advance_scheduled = true;

        let room = self.me.clone();
        let delay = self.context.config.auto_advance_delay;

        handle.spawn(async move {
            sleep(delay).await;

            if let Some(room) = room.upgrade() {
                room.auto_advance();
            }
        });
    }

    fn auto_advance(&self) {
        let Ok(mut state) = self.lock() else {
            return;
        };

        state.advance_scheduled = false;

        if state.data.needs_advance() {
            self.advance_locked(&mut state);
        }
    }

    fn broadcast(&self, data: &RoomData, event: CollabEvent, recipients: Recipients) {
        trace!("Sending {} to room {}", event.name(), self.id);
        fan_out(self.context.transport.as_ref(), data, event, recipients);
    }
}
