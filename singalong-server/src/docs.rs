use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{gateway, rooms, schemas, search, serialized};

#[derive(OpenApi)]
#[openapi(
    paths(
        rooms::list_rooms,
        rooms::room,
        rooms::create_room,
        search::search,
        gateway::gateway,
    ),
    components(schemas(
        serialized::Room,
        serialized::RoomSummary,
        serialized::Visibility,
        serialized::Member,
        serialized::RoomSettings,
        serialized::RoomStats,
        serialized::Priority,
        serialized::QueueItem,
        serialized::CurrentSong,
        serialized::VideoResult,
        serialized::SearchResult,
        schemas::NewRoomSchema,
        schemas::VisibilitySchema,
    )),
    info(
        description = "singalong-server exposes endpoints to find, create and join singalong rooms"
    )
)]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod test {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn documents_every_route() {
        let api = ApiDoc::openapi();

        for path in ["/v1/rooms", "/v1/rooms/{roomId}", "/v1/search", "/v1/gateway"] {
            assert!(api.paths.paths.contains_key(path), "{} is documented", path);
        }
    }
}
