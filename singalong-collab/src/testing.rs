use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Collab, CollabEvent, Config, ConnectionId, NoLookup, Transport};

/// A transport that records every event it is asked to send
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(ConnectionId, CollabEvent)>>,
}

impl Transport for RecordingTransport {
    fn send(&self, connection: ConnectionId, event: CollabEvent) {
        self.sent.lock().push((connection, event));
    }
}

impl RecordingTransport {
    /// Returns the names of the events received by a connection, in order
    pub fn received(&self, connection: ConnectionId) -> Vec<&'static str> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| *c == connection)
            .map(|(_, e)| e.name())
            .collect()
    }

    /// Returns the events received by a connection, in order
    pub fn events(&self, connection: ConnectionId) -> Vec<CollabEvent> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| *c == connection)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

/// Creates a collab system that records what it sends
pub fn mock_collab(config: Config) -> (Collab, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let collab = Collab::new(config, transport.clone(), Arc::new(NoLookup));

    (collab, transport)
}
