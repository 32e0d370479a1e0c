pub mod albums;
pub mod auth;
pub mod middleware;

pub use albums::{album_routes, AppState};
pub use auth::auth_routes;

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
