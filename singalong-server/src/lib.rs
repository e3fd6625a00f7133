mod context;
mod docs;
mod errors;
mod events;
mod gateway;
mod rooms;
mod schemas;
mod search;
mod serialized;

use std::net::{Ipv6Addr, SocketAddr};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use context::ServerContext;
pub use gateway::Gateway;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 3000;

pub type Router = axum::Router<ServerContext>;

/// Starts the singalong server
pub async fn run_server(context: ServerContext, port: u16) -> std::io::Result<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/rooms", rooms::router())
        .nest("/search", search::router())
        .nest("/gateway", gateway::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, root_router).await
}
