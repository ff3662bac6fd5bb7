//! Axum router construction for the observer API.

use axum::Router;
use axum::routing::get;
use shardwatch_core::ArtifactContext;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::ws;

/// Build the complete router for the observer server.
///
/// The router includes:
/// - `GET /ws/artifacts` -- change event stream
/// - `GET /api/artifacts/kinds` -- known kinds
/// - `GET /api/artifacts/kinds/{kind}/summary` -- per-kind listing rows
/// - `GET /api/artifacts/locations` -- relevant locations
/// - `GET /api/artifacts/locations/{id}` -- one location
/// - `GET /api/artifacts/locations/{id}/kinds/{kind}` -- one detail
/// - `GET /api/artifacts/entities` -- raw entity records
///
/// CORS allows any origin so browser-side renderers can read the API.
pub fn build_router(ctx: ArtifactContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/artifacts", get(ws::ws_artifacts))
        .route("/api/artifacts/kinds", get(handlers::list_kinds))
        .route(
            "/api/artifacts/kinds/{kind}/summary",
            get(handlers::kind_summary),
        )
        .route("/api/artifacts/locations", get(handlers::list_locations))
        .route("/api/artifacts/locations/{id}", get(handlers::get_location))
        .route(
            "/api/artifacts/locations/{id}/kinds/{kind}",
            get(handlers::get_detail),
        )
        .route("/api/artifacts/entities", get(handlers::list_entities))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
