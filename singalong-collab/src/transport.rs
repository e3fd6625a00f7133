use crate::{CollabEvent, Id};

/// A live transport connection, e.g. a websocket.
pub struct Connection;

pub type ConnectionId = Id<Connection>;

/// Delivers events to individual connections.
///
/// Implementations must not block, since events are sent while a room is locked.
pub trait Transport: Send + Sync {
    /// Sends an event to a single connection. Unknown connections are ignored.
    fn send(&self, connection: ConnectionId, event: CollabEvent);
}
