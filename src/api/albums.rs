use crate::api::middleware::BearerToken;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Album;
use crate::services::{archive, SupabaseClient, TokenVerifier};
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub struct AppState {
    pub config: Config,
    pub supabase: SupabaseClient,
    pub verifier: TokenVerifier,
}

pub fn album_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/albums/:album_id/download", get(download_album))
        .route("/albums/debug/logs", get(download_logs))
}

/// Streams an album's songs as one ZIP attachment.
///
/// Private albums require a verified bearer token whose subject owns the
/// album; public albums ignore the credential entirely. Songs that cannot
/// be fetched are left out of the archive rather than failing the request.
async fn download_album(
    State(state): State<Arc<AppState>>,
    Path(album_id): Path<Uuid>,
    BearerToken(token): BearerToken,
) -> Result<Response> {
    let album = state
        .supabase
        .fetch_album(album_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;

    if album.is_private {
        let token =
            token.ok_or_else(|| AppError::Unauthorized("Album is private".to_string()))?;
        let claims = state.verifier.verify(&token)?;
        if claims.sub != album.artist_id {
            return Err(AppError::Forbidden(
                "You don't have permission to download this album".to_string(),
            ));
        }
    }

    let songs = state.supabase.fetch_songs(album_id).await?;
    if songs.is_empty() {
        return Err(AppError::NotFound("No songs found in album".to_string()));
    }

    tracing::info!(
        "Starting album download: {} ({} songs)",
        album.title,
        songs.len()
    );

    let buffer = archive::build_album_archive(&songs).await?;

    let disposition = format!("attachment; filename=\"{}\"", download_filename(&album));
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    let body = Body::from_stream(archive::archive_stream(buffer));
    Ok((headers, body).into_response())
}

/// Serves the append-only download log for remote debugging. Never fails;
/// problems are reported inside the body, as the log consumers expect.
async fn download_logs(State(state): State<Arc<AppState>>) -> Json<Value> {
    let Some(path) = state.config.download_log_file.as_ref() else {
        return Json(json!({"error": "Download log file is not configured"}));
    };

    match tokio::fs::read_to_string(path).await {
        Ok(logs) => Json(json!({
            "log_file": path.display().to_string(),
            "logs": logs,
        })),
        Err(e) => Json(json!({"error": format!("Could not read log file: {}", e)})),
    }
}

/// Attachment filename for the Content-Disposition header. Header values
/// must be ASCII, so anything else in the title is dropped; a title with
/// nothing left falls back to the album id.
fn download_filename(album: &Album) -> String {
    let safe: String = album
        .title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        format!("album_{}.zip", album.id)
    } else {
        format!("{}.zip", safe)
    }
}
