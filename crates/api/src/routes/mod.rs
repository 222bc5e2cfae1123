//! API routes

pub mod health;
pub mod register;
pub mod stream;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    security::{cors_layer, security_headers_middleware},
    state::AppState,
};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check (root level for infrastructure monitoring)
    let health_routes = Router::new().route("/health", get(health::health));

    // Called by the player service, guarded by x-api-key
    let internal_routes = Router::new().route("/register", post(register::register));

    // Public media routes
    let media_routes = Router::new()
        .route("/stream/:token", get(stream::stream))
        .route("/stream/:token/", get(stream::stream))
        .route("/stream/:token/*sub_path", get(stream::stream_sub_path))
        .route("/image/:token", get(stream::image));

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(health_routes)
        .merge(internal_routes)
        .merge(media_routes)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
