use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json,
};
use log::info;
use singalong_collab::is_valid_room_id;

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{NewRoomSchema, ValidatedJson},
    serialized::{Room, RoomSummary, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/rooms",
    tag = "rooms",
    responses(
        (status = 200, description = "Public rooms, the most populated first", body = Vec<RoomSummary>)
    )
)]
async fn list_rooms(State(context): State<ServerContext>) -> impl IntoResponse {
    let rooms: Vec<RoomSummary> = context.collab.rooms.list_public().to_serialized();

    Json(rooms)
}

#[utoipa::path(
    get,
    path = "/v1/rooms/{roomId}",
    tag = "rooms",
    params(
        ("roomId" = String, Path, description = "The id of the room, created if it doesn't exist")
    ),
    responses(
        (status = 200, body = Room),
        (status = 400, description = "The room id is blank or too long")
    )
)]
async fn room(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
) -> ServerResult<Json<Room>> {
    if !is_valid_room_id(&room_id) {
        return Err(ServerError::InvalidRoomId(room_id));
    }

    let room = context.collab.rooms.get_or_create(&room_id);

    Ok(Json(room.data().to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/rooms",
    tag = "rooms",
    request_body = NewRoomSchema,
    responses(
        (status = 200, description = "A room with a generated id", body = Room)
    )
)]
async fn create_room(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewRoomSchema>,
) -> Json<Room> {
    let room = context
        .collab
        .rooms
        .create_room(body.room_name, body.visibility.into());

    info!("Room {} was created through the API", room.id());

    Json(room.data().to_serialized())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/:room_id", get(room))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use singalong_collab::{Config, NoLookup};

    use crate::context::ServerContext;

    use super::room;

    #[tokio::test]
    async fn blank_room_ids_are_rejected() {
        let context = ServerContext::new(Config::default(), Arc::new(NoLookup));

        let response = room(State(context.clone()), Path("  ".to_string()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(context.collab.rooms.list_all().is_empty());

        let response = room(State(context.clone()), Path("abc123".to_string()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(context.collab.rooms.room_by_id("ABC123").is_ok());
    }
}
