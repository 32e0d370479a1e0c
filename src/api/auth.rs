use crate::api::albums::AppState;
use crate::api::middleware::RequireUser;
use crate::error::{AppError, Result};
use crate::models::artist::slugify;
use crate::models::{ArtistStub, EnsureArtistRequest, InitArtistProfileRequest, NewArtist};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/init-artist-profile", post(init_artist_profile))
        .route("/ensure-artist", post(ensure_artist))
        .route("/profile", get(profile))
}

/// Creates the artist profile row after signup. Safe to call repeatedly;
/// an existing row is reported rather than treated as an error.
async fn init_artist_profile(
    State(state): State<Arc<AppState>>,
    RequireUser(claims): RequireUser,
    body: Option<Json<InitArtistProfileRequest>>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if state.supabase.fetch_artist(claims.sub).await?.is_some() {
        return Ok(Json(already_exists(claims.sub)));
    }

    let name = req
        .artist_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Artist".to_string());
    let slug = req
        .artist_slug
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(&name));

    let artist = NewArtist {
        id: claims.sub,
        name,
        slug,
        email: String::new(),
        city: req.city.unwrap_or_default(),
        state: req.state.unwrap_or_default(),
        genre: req.genre.unwrap_or_default(),
        style: req.style.unwrap_or_default(),
        bio: String::new(),
        avatar_url: String::new(),
        cover_url: String::new(),
        followers_count: 0,
        is_verified: false,
    };

    tracing::info!("Creating artist profile for {}", claims.sub);

    match state.supabase.insert_artist(&artist).await {
        Ok(_) => Ok(Json(json!({
            "success": true,
            "message": "Artist profile created successfully",
            "artist_id": claims.sub,
            "already_exists": false,
        }))),
        Err(e) => {
            // A concurrent call may have won the insert between our
            // existence check and now.
            if state.supabase.fetch_artist(claims.sub).await?.is_some() {
                return Ok(Json(already_exists(claims.sub)));
            }
            Err(e)
        }
    }
}

/// Fallback used across the app: make sure an artist row exists for the
/// caller, creating a minimal one if needed.
async fn ensure_artist(
    State(state): State<Arc<AppState>>,
    RequireUser(claims): RequireUser,
    body: Option<Json<EnsureArtistRequest>>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if state.supabase.fetch_artist(claims.sub).await?.is_none() {
        let name = req
            .artist_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Artist".to_string());

        tracing::info!("Creating minimal artist record for {}", claims.sub);

        state
            .supabase
            .insert_artist(&ArtistStub {
                id: claims.sub,
                name,
            })
            .await?;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Artist profile ensured",
        "artist_id": claims.sub,
    })))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    RequireUser(claims): RequireUser,
) -> Result<Json<Value>> {
    match state.supabase.fetch_artist(claims.sub).await? {
        Some(artist) => Ok(Json(json!({
            "success": true,
            "type": "artist",
            "profile": artist,
        }))),
        None => Ok(Json(json!({
            "success": true,
            "type": "user",
            "profile": null,
        }))),
    }
}

fn already_exists(artist_id: Uuid) -> Value {
    json!({
        "success": true,
        "message": "Artist profile already exists",
        "already_exists": true,
        "artist_id": artist_id,
    })
}
