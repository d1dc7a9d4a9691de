//! REST API for guided step-by-step sessions.
//!
//! Exposes the session coordinator over HTTP: start a session, read the one
//! disclosed step, navigate, inspect progress and adapt a guide.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/api/v1/health", get(routes::health::health))
        // Session endpoints
        .route("/api/v1/sessions", post(routes::sessions::start))
        .route(
            "/api/v1/sessions/:id/current",
            get(routes::sessions::current),
        )
        .route(
            "/api/v1/sessions/:id/advance",
            post(routes::sessions::advance),
        )
        .route(
            "/api/v1/sessions/:id/retreat",
            post(routes::sessions::retreat),
        )
        .route("/api/v1/sessions/:id/jump", post(routes::sessions::jump))
        .route(
            "/api/v1/sessions/:id/progress",
            get(routes::sessions::progress),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section_id",
            get(routes::sessions::section_overview),
        )
        // Guide endpoints
        .route(
            "/api/v1/guides/:guide_id/adaptations",
            post(routes::guides::adapt),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("REST API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
