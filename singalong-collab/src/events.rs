use crate::{ChatMessage, NowPlaying, PlayerIntent, QueueEntry, RoomData, Timestamp, UserId};

/// Events sent to the connections of a room
#[derive(Debug, Clone)]
pub enum CollabEvent {
    /// Sent to a connection that joined, containing the full room state.
    RoomJoined { room: RoomData },
    /// A user joined or rejoined the room
    MemberJoined {
        user_id: UserId,
        user_name: String,
        member_count: usize,
    },
    /// A user left the room
    MemberLeft {
        user_id: UserId,
        /// Absent if the user was not a member anymore
        user_name: Option<String>,
        member_count: usize,
    },
    /// The queue of a room was modified
    QueueUpdated { queue: Vec<QueueEntry> },
    /// The currently playing song changed
    SongChanged { song: Option<NowPlaying> },
    /// A member asked every player to toggle between playing and paused
    RemoteTogglePlay {
        user_id: UserId,
        user_name: String,
        timestamp: Timestamp,
    },
    /// A member asked every player to restart the current song
    RestartSong {
        song: NowPlaying,
        user_name: String,
        timestamp: Timestamp,
    },
    /// A member's player changed state
    PlayerState {
        state: PlayerIntent,
        /// The position of the origin player, in seconds.
        current_time: Option<f64>,
        user_name: String,
        timestamp: Timestamp,
    },
    /// A chat message, or a system notice
    ChatMessage(ChatMessage),
    /// A request failed, only ever sent to the requesting connection.
    Error { message: String },
}

impl CollabEvent {
    /// The name of the event as seen by clients
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomJoined { .. } => "room-joined",
            Self::MemberJoined { .. } => "member-joined",
            Self::MemberLeft { .. } => "member-left",
            Self::QueueUpdated { .. } => "queue-updated",
            Self::SongChanged { .. } => "song-changed",
            Self::RemoteTogglePlay { .. } => "remote-toggle-play",
            Self::RestartSong { .. } => "restart-song",
            Self::PlayerState { .. } => "player-state",
            Self::ChatMessage(_) => "chat-message",
            Self::Error { .. } => "error",
        }
    }
}
