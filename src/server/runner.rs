//! Router construction and server execution.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    handler::{create_room, delete_room, health_check, join_room, list_members, list_rooms},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router. Exposed so tests can serve the exact same
/// routes on an ephemeral port.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket endpoint: joining a room upgrades the connection
        .route("/rooms/{room_id}", get(join_room))
        // HTTP endpoints
        .route("/api/health", get(health_check))
        .route("/api/rooms", post(create_room).get(list_rooms))
        .route("/api/rooms/{room_id}", delete(delete_room))
        .route("/api/rooms/{room_id}/members", get(list_members))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the chat server until a shutdown signal arrives.
///
/// # Arguments
///
/// * `host` - The host address to bind to (e.g., "127.0.0.1")
/// * `port` - The port number to bind to (e.g., 8080)
/// * `origin` - The browser origin allowed by the CORS policy
pub async fn run_server(
    host: String,
    port: u16,
    origin: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let allowed_origin = origin.parse::<HeaderValue>()?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let state = Arc::new(AppState::new());
    let app = build_router(state).layer(cors);

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("chat server listening on {}", listener.local_addr()?);
    tracing::info!("join rooms at ws://{}/rooms/{{room_id}}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");

    Ok(())
}
