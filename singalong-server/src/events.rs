use serde::Serialize;
use singalong_collab::CollabEvent;

use crate::serialized::{ChatMessage, CurrentSong, PlayerState, QueueItem, Room, ToSerialized};

/// An event sent to a gateway connection, framed as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case", tag = "event", content = "data")]
pub enum ServerEvent {
    /// The full state of a room the connection just joined
    RoomJoined { room: Room },
    /// Another user joined the room
    #[serde(rename_all = "camelCase")]
    MemberJoined {
        user_id: String,
        user_name: String,
        member_count: usize,
    },
    /// A user left the room
    #[serde(rename_all = "camelCase")]
    MemberLeft {
        user_id: String,
        user_name: Option<String>,
        member_count: usize,
    },
    QueueUpdated { queue: Vec<QueueItem> },
    /// The currently playing song changed, absent if the queue ran out
    SongChanged { song: Option<CurrentSong> },
    #[serde(rename_all = "camelCase")]
    RemoteTogglePlay {
        user_id: String,
        user_name: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    RestartSong {
        song: CurrentSong,
        user_name: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    PlayerState {
        state: PlayerState,
        /// The position of the sending player, in seconds.
        current_time: Option<f64>,
        user_name: String,
        timestamp: i64,
    },
    ChatMessage(ChatMessage),
    /// A request from this connection failed
    Error { message: String },
}

impl From<CollabEvent> for ServerEvent {
    fn from(value: CollabEvent) -> Self {
        match value {
            CollabEvent::RoomJoined { room } => Self::RoomJoined {
                room: room.to_serialized(),
            },
            CollabEvent::MemberJoined {
                user_id,
                user_name,
                member_count,
            } => Self::MemberJoined {
                user_id,
                user_name,
                member_count,
            },
            CollabEvent::MemberLeft {
                user_id,
                user_name,
                member_count,
            } => Self::MemberLeft {
                user_id,
                user_name,
                member_count,
            },
            CollabEvent::QueueUpdated { queue } => Self::QueueUpdated {
                queue: queue.to_serialized(),
            },
            CollabEvent::SongChanged { song } => Self::SongChanged {
                song: song.to_serialized(),
            },
            CollabEvent::RemoteTogglePlay {
                user_id,
                user_name,
                timestamp,
            } => Self::RemoteTogglePlay {
                user_id,
                user_name,
                timestamp,
            },
            CollabEvent::RestartSong {
                song,
                user_name,
                timestamp,
            } => Self::RestartSong {
                song: song.to_serialized(),
                user_name,
                timestamp,
            },
            CollabEvent::PlayerState {
                state,
                current_time,
                user_name,
                timestamp,
            } => Self::PlayerState {
                state: state.to_serialized(),
                current_time,
                user_name,
                timestamp,
            },
            CollabEvent::ChatMessage(message) => Self::ChatMessage(message.to_serialized()),
            CollabEvent::Error { message } => Self::Error { message },
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::{json, to_value};
    use singalong_collab::{
        ChatMessage, CollabEvent, Config, NowPlaying, Priority, QueueEntry, RoomData,
        SongRequest, Visibility,
    };

    use super::ServerEvent;

    fn entry() -> QueueEntry {
        let request = SongRequest {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Never Gonna Give You Up".to_string(),
            thumbnail: None,
        };

        QueueEntry::new(request, "a".to_string(), "Alice".to_string(), 10, Priority::High)
    }

    #[test]
    fn member_events_are_framed() {
        let event: ServerEvent = CollabEvent::MemberLeft {
            user_id: "a".to_string(),
            user_name: None,
            member_count: 2,
        }
        .into();

        assert_eq!(
            to_value(event).expect("serializes"),
            json!({
                "event": "member-left",
                "data": { "userId": "a", "userName": null, "memberCount": 2 }
            })
        );
    }

    #[test]
    fn current_song_is_flattened() {
        let event: ServerEvent = CollabEvent::SongChanged {
            song: Some(NowPlaying {
                entry: entry(),
                started_at: 20,
            }),
        }
        .into();

        assert_eq!(
            to_value(event).expect("serializes"),
            json!({
                "event": "song-changed",
                "data": {
                    "song": {
                        "videoId": "dQw4w9WgXcQ",
                        "title": "Never Gonna Give You Up",
                        "thumbnail": null,
                        "addedBy": "a",
                        "addedByName": "Alice",
                        "addedAt": 10,
                        "priority": "high",
                        "startedAt": 20
                    }
                }
            })
        );
    }

    #[test]
    fn chat_message_is_the_payload() {
        let event: ServerEvent = CollabEvent::ChatMessage(ChatMessage::system(
            "Hello".to_string(),
            5,
        ))
        .into();

        assert_eq!(
            to_value(event).expect("serializes"),
            json!({
                "event": "chat-message",
                "data": { "userId": "system", "userName": "System", "message": "Hello", "timestamp": 5 }
            })
        );
    }

    #[test]
    fn snapshot_uses_client_names() {
        let data = RoomData::new(
            "482913".to_string(),
            None,
            Visibility::Private,
            &Config::default(),
            0,
        );

        let value = to_value(ServerEvent::from(CollabEvent::RoomJoined { room: data }))
            .expect("serializes");

        let room = &value["data"]["room"];

        assert_eq!(value["event"], "room-joined");
        assert_eq!(room["roomId"], "482913");
        assert_eq!(room["roomName"], "Room 482913");
        assert_eq!(room["type"], "private");
        assert_eq!(room["settings"]["maxMembers"], 50);
        assert_eq!(room["stats"]["peakMembers"], 0);
        assert!(room["currentSong"].is_null());
    }
}
