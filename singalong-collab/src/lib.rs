mod config;
mod events;
mod lookup;
mod rooms;
mod transport;
mod util;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use dashmap::DashMap;
use log::warn;

pub use config::*;
pub use events::*;
pub use lookup::*;
pub use rooms::*;
pub use transport::*;
pub use util::{Id, IdType, Timestamp};

// Reduces verbosity
type Store<Id, T> = Arc<DashMap<Id, Arc<T>>>;

/// The singalong collab system, keeping rooms, their members, queues and playback in sync.
pub struct Collab {
    context: CollabContext,
    lookup: Arc<dyn VideoLookup>,

    pub rooms: RoomManager,
}

/// A type passed to various components of the collab system, to access state and send events.
#[derive(Clone)]
pub struct CollabContext {
    pub config: Config,
    pub transport: Arc<dyn Transport>,

    pub rooms: Store<RoomId, Room>,
}

impl Collab {
    pub fn new(config: Config, transport: Arc<dyn Transport>, lookup: Arc<dyn VideoLookup>) -> Self {
        let context = CollabContext {
            config,
            transport,
            rooms: Default::default(),
        };

        let room_manager = RoomManager::new(&context);

        Self {
            context,
            lookup,
            rooms: room_manager,
        }
    }

    /// Searches for videos. Lookup failures degrade to a manual search link.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        match self.lookup.search(query).await {
            Ok(results) => SearchOutcome::found(results),
            Err(error) => {
                if !matches!(error, LookupError::Unconfigured) {
                    warn!("Search for \"{}\" failed: {}", query, error);
                }

                SearchOutcome::fallback(query, &error)
            }
        }
    }
}
