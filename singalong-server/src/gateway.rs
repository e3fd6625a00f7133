use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use log::{info, trace, warn};
use singalong_collab::{Collab, CollabEvent, ConnectionId, TransientControl, Transport};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use validator::Validate;

use crate::{context::ServerContext, events::ServerEvent, schemas::ClientMessage, Router};

/// Manages websocket connections, and delivers collab events to them
#[derive(Default)]
pub struct Gateway {
    connections: DashMap<ConnectionId, UnboundedSender<ServerEvent>>,
}

impl Gateway {
    pub fn new() -> Arc<Self> {
        Default::default()
    }

    /// Returns how many connections are open
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn connect(&self) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId::new();
        let (sender, receiver) = unbounded_channel();

        self.connections.insert(id, sender);
        (id, receiver)
    }

    fn disconnect(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }
}

impl Transport for Gateway {
    fn send(&self, connection: ConnectionId, event: CollabEvent) {
        let Some(sender) = self.connections.get(&connection) else {
            trace!("Connection {} is gone, dropping {}", connection, event.name());
            return;
        };

        // Fails only if the writer stopped, which means the connection is closing
        let _ = sender.send(event.into());
    }
}

/// Parses a frame from a connection and applies it to the room it targets.
/// Invalid frames, and events the rooms reject, are dropped.
fn dispatch(collab: &Collab, connection: ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(error) => {
            warn!("Dropping malformed message from connection {}: {}", connection, error);
            return;
        }
    };

    if let Err(error) = message.validate() {
        warn!("Dropping invalid message from connection {}: {}", connection, error);
        return;
    }

    let rooms = &collab.rooms;

    let result = match message {
        ClientMessage::JoinRoom(s) => rooms
            .join(&s.room_id, &s.user_id, &s.user_name, connection)
            .map(|_| ()),
        ClientMessage::LeaveRoom(s) => rooms.leave(&s.room_id, &s.user_id),
        ClientMessage::AddSong(s) => {
            rooms.enqueue(&s.room_id, &s.user_id, s.song.into(), s.priority.into())
        }
        ClientMessage::RemoveSong(s) => rooms.remove(&s.room_id, &s.user_id, s.song_index),
        ClientMessage::PrioritizeSong(s) => rooms.promote(&s.room_id, &s.user_id, s.song_index),
        ClientMessage::PlayNext(s) => rooms.advance(&s.room_id, &s.user_id),
        ClientMessage::TogglePlay(s) => rooms.relay(
            &s.room_id,
            &s.user_id,
            connection,
            TransientControl::TogglePlay,
        ),
        ClientMessage::PlayPrev(s) => rooms.relay(
            &s.room_id,
            &s.user_id,
            connection,
            TransientControl::Restart,
        ),
        ClientMessage::PlayerState(s) => {
            rooms.relay(&s.room_id, &s.user_id, connection, s.control())
        }
        ClientMessage::ChatMessage(s) => rooms.chat(&s.room_id, &s.user_id, &s.message),
    };

    if let Err(error) = result {
        trace!("Dropped event from connection {}: {}", connection, error);
    }
}

async fn handle_socket(socket: WebSocket, context: ServerContext) {
    let (id, mut events) = context.gateway.connect();
    let (mut outgoing, mut incoming) = socket.split();

    info!(
        "Connection {} opened, {} connection(s) open",
        id,
        context.gateway.connection_count()
    );

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(error) => {
                    warn!("Failed to serialize event for connection {}: {}", id, error);
                    continue;
                }
            };

            if outgoing.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = incoming.next().await {
        match message {
            Ok(Message::Text(text)) => dispatch(&context.collab, id, &text),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                trace!("Connection {} errored: {}", id, error);
                break;
            }
        }
    }

    // Dropping the sender stops the writer
    context.gateway.disconnect(id);
    let removed = context.collab.rooms.disconnect(id);

    if writer.await.is_err() {
        warn!("Writer for connection {} panicked", id);
    }

    info!(
        "Connection {} closed, left {} room(s), {} connection(s) open",
        id,
        removed,
        context.gateway.connection_count()
    );
}

#[utoipa::path(
    get,
    path = "/v1/gateway",
    tag = "gateway",
    responses(
        (
            status = 101,
            description = "Upgrades to a websocket exchanging {\"event\", \"data\"} frames"
        )
    )
)]
async fn gateway(ws: WebSocketUpgrade, State(context): State<ServerContext>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, context))
}

pub fn router() -> Router {
    Router::new().route("/", get(gateway))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use singalong_collab::{Collab, CollabEvent, Config, NoLookup, Transport};

    use crate::events::ServerEvent;

    use super::{dispatch, Gateway};

    fn setup() -> (Collab, Arc<Gateway>) {
        let gateway = Gateway::new();
        let collab = Collab::new(Config::default(), gateway.clone(), Arc::new(NoLookup));

        (collab, gateway)
    }

    #[test]
    fn delivers_to_open_connections() {
        let gateway = Gateway::new();
        let (id, mut events) = gateway.connect();

        gateway.send(
            id,
            CollabEvent::Error {
                message: "Nope".to_string(),
            },
        );

        assert!(matches!(events.try_recv(), Ok(ServerEvent::Error { .. })));

        gateway.disconnect(id);
        gateway.send(
            id,
            CollabEvent::Error {
                message: "Gone".to_string(),
            },
        );

        assert_eq!(gateway.connection_count(), 0);
    }

    #[test]
    fn join_frames_reach_the_room() {
        let (collab, gateway) = setup();
        let (id, mut events) = gateway.connect();

        dispatch(
            &collab,
            id,
            r#"{ "event": "join-room", "data": { "roomId": "abc123", "userId": "a", "userName": "Alice" } }"#,
        );

        assert!(matches!(events.try_recv(), Ok(ServerEvent::RoomJoined { .. })));

        let room = collab.rooms.room_by_id("ABC123").expect("room was created");
        assert_eq!(room.data().members.len(), 1);
    }

    #[test]
    fn bad_frames_are_dropped() {
        let (collab, gateway) = setup();
        let (id, mut events) = gateway.connect();

        dispatch(&collab, id, "not json");
        dispatch(
            &collab,
            id,
            r#"{ "event": "join-room", "data": { "roomId": "", "userId": "a", "userName": "Alice" } }"#,
        );
        dispatch(
            &collab,
            id,
            r#"{ "event": "chat-message", "data": { "roomId": "ABC123", "userId": "a", "message": "hi" } }"#,
        );

        assert!(events.try_recv().is_err());
        assert!(collab.rooms.list_all().is_empty());
    }
}
