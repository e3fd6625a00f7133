use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use singalong_collab::{
    is_valid_room_id, PlayerIntent, Priority, SongRequest, TransientControl, Visibility,
};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRoomSchema {
    #[validate(length(max = 64))]
    pub room_name: Option<String>,
    #[serde(default)]
    pub visibility: VisibilitySchema,
}

#[derive(Debug, Clone, Copy, Default, ToSchema, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilitySchema {
    #[default]
    Public,
    Private,
}

#[derive(Debug, IntoParams, Validate, Deserialize)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// What to search for
    #[validate(length(max = 200))]
    pub query: Option<String>,
}

/// A message received from a gateway connection, framed as `{"event": ..., "data": ...}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "event", content = "data")]
pub enum ClientMessage {
    JoinRoom(JoinRoomSchema),
    LeaveRoom(MemberSchema),
    AddSong(AddSongSchema),
    RemoveSong(SongIndexSchema),
    PrioritizeSong(SongIndexSchema),
    PlayNext(MemberSchema),
    TogglePlay(MemberSchema),
    PlayPrev(MemberSchema),
    PlayerState(PlayerStateSchema),
    ChatMessage(ChatMessageSchema),
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomSchema {
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(min = 1, max = 64))]
    pub user_name: String,
}

/// Identifies the member acting in a room
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSchema {
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongSchema {
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(nested)]
    pub song: SongSchema,
    #[serde(default)]
    pub priority: PrioritySchema,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSchema {
    #[validate(length(min = 1, max = 64))]
    pub video_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 2048))]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrioritySchema {
    #[default]
    Normal,
    High,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongIndexSchema {
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    pub song_index: usize,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateSchema {
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    pub state: PlayerStateKind,
    #[validate(range(min = 0.0))]
    pub current_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStateKind {
    Play,
    Pause,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageSchema {
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(max = 2000))]
    pub message: String,
}

impl Validate for ClientMessage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::JoinRoom(schema) => schema.validate(),
            Self::LeaveRoom(schema) => schema.validate(),
            Self::AddSong(schema) => schema.validate(),
            Self::RemoveSong(schema) => schema.validate(),
            Self::PrioritizeSong(schema) => schema.validate(),
            Self::PlayNext(schema) => schema.validate(),
            Self::TogglePlay(schema) => schema.validate(),
            Self::PlayPrev(schema) => schema.validate(),
            Self::PlayerState(schema) => schema.validate(),
            Self::ChatMessage(schema) => schema.validate(),
        }
    }
}

fn validate_room_id(room_id: &str) -> Result<(), ValidationError> {
    if is_valid_room_id(room_id) {
        Ok(())
    } else {
        Err(ValidationError::new("room_id"))
    }
}

impl From<VisibilitySchema> for Visibility {
    fn from(value: VisibilitySchema) -> Self {
        match value {
            VisibilitySchema::Public => Self::Public,
            VisibilitySchema::Private => Self::Private,
        }
    }
}

impl From<PrioritySchema> for Priority {
    fn from(value: PrioritySchema) -> Self {
        match value {
            PrioritySchema::Normal => Self::Normal,
            PrioritySchema::High => Self::High,
        }
    }
}

impl From<SongSchema> for SongRequest {
    fn from(value: SongSchema) -> Self {
        Self {
            video_id: value.video_id,
            title: value.title,
            thumbnail: value.thumbnail.filter(|t| !t.is_empty()),
        }
    }
}

impl PlayerStateSchema {
    pub fn control(&self) -> TransientControl {
        let state = match self.state {
            PlayerStateKind::Play => PlayerIntent::Play,
            PlayerStateKind::Pause => PlayerIntent::Pause,
        };

        TransientControl::PlayerState {
            state,
            current_time: self.current_time,
        }
    }
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}

#[cfg(test)]
mod test {
    use serde_json::from_str;
    use validator::Validate;

    use super::{ClientMessage, PrioritySchema};

    #[test]
    fn parses_framed_messages() {
        let message: ClientMessage = from_str(
            r#"{
                "event": "add-song",
                "data": {
                    "roomId": "482913",
                    "userId": "a",
                    "song": { "videoId": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up" }
                }
            }"#,
        )
        .expect("parses");

        let schema = match message {
            ClientMessage::AddSong(schema) => schema,
            other => panic!("expected add-song, got {:?}", other),
        };

        assert!(matches!(schema.priority, PrioritySchema::Normal));
        assert_eq!(schema.song.thumbnail, None);
    }

    #[test]
    fn rejects_unknown_events() {
        let result = from_str::<ClientMessage>(r#"{ "event": "drop-table", "data": {} }"#);
        assert!(result.is_err());
    }

    #[test]
    fn validates_nested_fields() {
        let message: ClientMessage = from_str(
            r#"{
                "event": "add-song",
                "data": {
                    "roomId": "482913",
                    "userId": "a",
                    "song": { "videoId": "", "title": "Untitled" },
                    "priority": "high"
                }
            }"#,
        )
        .expect("parses");

        assert!(message.validate().is_err());
    }

    #[test]
    fn validates_room_ids_after_normalizing() {
        let message: ClientMessage = from_str(
            r#"{
                "event": "join-room",
                "data": { "roomId": "   ", "userId": "a", "userName": "Alice" }
            }"#,
        )
        .expect("parses");

        assert!(message.validate().is_err());

        let message: ClientMessage = from_str(
            r#"{
                "event": "join-room",
                "data": { "roomId": " abc123 ", "userId": "a", "userName": "Alice" }
            }"#,
        )
        .expect("parses");

        assert!(message.validate().is_ok());
    }

    #[test]
    fn validates_player_state() {
        let message: ClientMessage = from_str(
            r#"{
                "event": "player-state",
                "data": { "roomId": "482913", "userId": "a", "state": "play", "currentTime": -4.0 }
            }"#,
        )
        .expect("parses");

        assert!(message.validate().is_err());

        let message: ClientMessage = from_str(
            r#"{
                "event": "player-state",
                "data": { "roomId": "482913", "userId": "a", "state": "pause" }
            }"#,
        )
        .expect("parses");

        assert!(message.validate().is_ok());
    }
}
