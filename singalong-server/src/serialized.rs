//! All schemas that are exposed from endpoints and the gateway are defined here
//! along with the ToSerialized impls

use serde::Serialize;
use singalong_collab::{
    ChatMessage as CollabChatMessage, Member as CollabMember, NowPlaying, PlayerIntent,
    Priority as CollabPriority, QueueEntry, RoomData, RoomSettings as CollabRoomSettings,
    RoomStats as CollabRoomStats, RoomSummary as CollabRoomSummary, SearchOutcome,
    VideoResult as CollabVideoResult, Visibility as CollabVisibility,
};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    room_id: String,
    room_name: String,
    #[serde(rename = "type")]
    visibility: Visibility,
    members: Vec<Member>,
    queue: Vec<QueueItem>,
    current_song: Option<CurrentSong>,
    settings: RoomSettings,
    stats: RoomStats,
    created_at: i64,
    last_active_at: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    room_id: String,
    room_name: String,
    member_count: usize,
    max_members: usize,
    current_song: Option<CurrentSong>,
    created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    user_id: String,
    user_name: String,
    joined_at: i64,
    last_active_at: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    max_members: usize,
    auto_delete: bool,
    allow_guest_control: bool,
    require_approval: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    total_songs_played: u64,
    total_members: u64,
    peak_members: usize,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    video_id: String,
    title: String,
    thumbnail: Option<String>,
    added_by: String,
    added_by_name: String,
    added_at: i64,
    priority: Priority,
}

/// A queue item that is currently playing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSong {
    #[serde(flatten)]
    item: QueueItem,
    started_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Play,
    Pause,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    user_id: String,
    user_name: String,
    message: String,
    timestamp: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    video_id: String,
    title: String,
    thumbnail: Option<String>,
    channel_title: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    results: Vec<VideoResult>,
    /// Set if the lookup was unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// A link to search manually, set if the lookup was unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    search_url: Option<String>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl<I, O> ToSerialized<Option<O>> for Option<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Option<O> {
        self.as_ref().map(|x| x.to_serialized())
    }
}

impl ToSerialized<Room> for RoomData {
    fn to_serialized(&self) -> Room {
        Room {
            room_id: self.id.clone(),
            room_name: self.name.clone(),
            visibility: self.visibility.to_serialized(),
            members: self.members.to_serialized(),
            queue: self.queue.entries().to_serialized(),
            current_song: self.current_song.to_serialized(),
            settings: self.settings.to_serialized(),
            stats: self.stats.to_serialized(),
            created_at: self.created_at,
            last_active_at: self.last_active_at,
        }
    }
}

impl ToSerialized<RoomSummary> for CollabRoomSummary {
    fn to_serialized(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id.clone(),
            room_name: self.name.clone(),
            member_count: self.member_count,
            max_members: self.max_members,
            current_song: self.current_song.to_serialized(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Visibility> for CollabVisibility {
    fn to_serialized(&self) -> Visibility {
        match self {
            CollabVisibility::Public => Visibility::Public,
            CollabVisibility::Private => Visibility::Private,
        }
    }
}

impl ToSerialized<Member> for CollabMember {
    fn to_serialized(&self) -> Member {
        Member {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            joined_at: self.joined_at,
            last_active_at: self.last_active_at,
        }
    }
}

impl ToSerialized<RoomSettings> for CollabRoomSettings {
    fn to_serialized(&self) -> RoomSettings {
        RoomSettings {
            max_members: self.max_members,
            auto_delete: self.auto_delete,
            allow_guest_control: self.allow_guest_control,
            require_approval: self.require_approval,
        }
    }
}

impl ToSerialized<RoomStats> for CollabRoomStats {
    fn to_serialized(&self) -> RoomStats {
        RoomStats {
            total_songs_played: self.total_songs_played,
            total_members: self.total_members_ever,
            peak_members: self.peak_member_count,
        }
    }
}

impl ToSerialized<Priority> for CollabPriority {
    fn to_serialized(&self) -> Priority {
        match self {
            CollabPriority::Normal => Priority::Normal,
            CollabPriority::High => Priority::High,
        }
    }
}

impl ToSerialized<QueueItem> for QueueEntry {
    fn to_serialized(&self) -> QueueItem {
        QueueItem {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            added_by: self.added_by.clone(),
            added_by_name: self.added_by_name.clone(),
            added_at: self.added_at,
            priority: self.priority.to_serialized(),
        }
    }
}

impl ToSerialized<CurrentSong> for NowPlaying {
    fn to_serialized(&self) -> CurrentSong {
        CurrentSong {
            item: self.entry.to_serialized(),
            started_at: self.started_at,
        }
    }
}

impl ToSerialized<PlayerState> for PlayerIntent {
    fn to_serialized(&self) -> PlayerState {
        match self {
            PlayerIntent::Play => PlayerState::Play,
            PlayerIntent::Pause => PlayerState::Pause,
        }
    }
}

impl ToSerialized<ChatMessage> for CollabChatMessage {
    fn to_serialized(&self) -> ChatMessage {
        ChatMessage {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            message: self.message.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl ToSerialized<VideoResult> for CollabVideoResult {
    fn to_serialized(&self) -> VideoResult {
        VideoResult {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            channel_title: self.channel_title.clone(),
        }
    }
}

impl ToSerialized<SearchResult> for SearchOutcome {
    fn to_serialized(&self) -> SearchResult {
        SearchResult {
            results: self.results.to_serialized(),
            message: self.message.clone(),
            search_url: self.search_url.clone(),
        }
    }
}
