//! Music-publishing backend: album ZIP downloads plus artist profile
//! endpoints, backed by a hosted database and object storage.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use crate::api::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .nest(
            "/api",
            Router::new()
                .merge(api::album_routes())
                .nest("/auth", api::auth_routes())
                .with_state(state),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
}
