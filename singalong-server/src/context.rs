use std::sync::Arc;

use axum::extract::FromRef;
use singalong_collab::{Collab, Config, VideoLookup};

use crate::gateway::Gateway;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub collab: Arc<Collab>,
    pub gateway: Arc<Gateway>,
}

impl ServerContext {
    /// Creates the collab system, with the gateway as its transport
    pub fn new(config: Config, lookup: Arc<dyn VideoLookup>) -> Self {
        let gateway = Gateway::new();
        let collab = Collab::new(config, gateway.clone(), lookup);

        Self {
            collab: Arc::new(collab),
            gateway,
        }
    }
}
