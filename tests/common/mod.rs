//! Shared test plumbing: a mock hosted-database/object-storage upstream,
//! app construction against it, and bearer-token minting.
#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use pressplay_backend::api::AppState;
use pressplay_backend::build_router;
use pressplay_backend::config::Config;
use pressplay_backend::services::{SupabaseClient, TokenVerifier};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

struct MockData {
    albums: Mutex<Vec<Value>>,
    songs: Mutex<Vec<Value>>,
    artists: Mutex<Vec<Value>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    // A queued winner row makes the next artist insert fail with 409.
    artist_conflict: Mutex<Option<Value>>,
    stalled: Mutex<HashSet<String>>,
}

/// In-process stand-in for the hosted database's REST surface and the
/// public object storage that audio URLs point into.
pub struct MockUpstream {
    pub base_url: String,
    data: Arc<MockData>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let data = Arc::new(MockData {
            albums: Mutex::new(Vec::new()),
            songs: Mutex::new(Vec::new()),
            artists: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
            artist_conflict: Mutex::new(None),
            stalled: Mutex::new(HashSet::new()),
        });

        let router = Router::new()
            .route("/rest/v1/albums", get(list_albums))
            .route("/rest/v1/songs", get(list_songs))
            .route("/rest/v1/artists", get(list_artists).post(create_artist))
            .route("/storage/:name", get(serve_object))
            .with_state(data.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            data,
        }
    }

    pub fn add_album(&self, id: Uuid, title: &str, is_private: bool, artist_id: Uuid) {
        self.data.albums.lock().unwrap().push(json!({
            "id": id,
            "title": title,
            "is_private": is_private,
            "artist_id": artist_id,
            "published_at": Utc::now(),
            "created_at": Utc::now(),
        }));
    }

    /// Songs are returned in insertion order; add them in track order.
    pub fn add_song(
        &self,
        album_id: Uuid,
        title: &str,
        track_number: Option<i32>,
        audio_url: Option<String>,
    ) {
        self.data.songs.lock().unwrap().push(json!({
            "id": Uuid::new_v4(),
            "album_id": album_id,
            "title": title,
            "track_number": track_number,
            "audio_url": audio_url,
        }));
    }

    pub fn add_artist(&self, id: Uuid, name: &str) {
        self.data.artists.lock().unwrap().push(json!({
            "id": id,
            "name": name,
        }));
    }

    /// Registers an object and returns its public URL.
    pub fn add_object(&self, name: &str, bytes: Vec<u8>) -> String {
        self.data
            .objects
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes);
        self.object_url(name)
    }

    /// Registers an object whose fetch never answers within any deadline
    /// a test would use, and returns its URL.
    pub fn add_stalled_object(&self, name: &str) -> String {
        self.data.stalled.lock().unwrap().insert(name.to_string());
        self.object_url(name)
    }

    /// Makes the next artist insert fail with a conflict, as if a
    /// concurrent request had just won the same insert. The winning row
    /// becomes visible to reads from that point on.
    pub fn lose_next_artist_insert_to(&self, id: Uuid, name: &str) {
        *self.data.artist_conflict.lock().unwrap() = Some(json!({
            "id": id,
            "name": name,
        }));
    }

    /// URL under the storage prefix; useful for objects that don't exist.
    pub fn object_url(&self, name: &str) -> String {
        format!("{}/storage/{}", self.base_url, name)
    }

    pub fn artists(&self) -> Vec<Value> {
        self.data.artists.lock().unwrap().clone()
    }
}

fn filter_rows(rows: &[Value], params: &HashMap<String, String>) -> Vec<Value> {
    rows.iter()
        .filter(|row| {
            params.iter().all(|(key, value)| match value.strip_prefix("eq.") {
                Some(want) => row.get(key).and_then(Value::as_str) == Some(want),
                None => true,
            })
        })
        .cloned()
        .collect()
}

async fn list_albums(
    State(data): State<Arc<MockData>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    Json(Value::Array(filter_rows(
        &data.albums.lock().unwrap(),
        &params,
    )))
}

async fn list_songs(
    State(data): State<Arc<MockData>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    Json(Value::Array(filter_rows(
        &data.songs.lock().unwrap(),
        &params,
    )))
}

async fn list_artists(
    State(data): State<Arc<MockData>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    Json(Value::Array(filter_rows(
        &data.artists.lock().unwrap(),
        &params,
    )))
}

async fn create_artist(State(data): State<Arc<MockData>>, Json(row): Json<Value>) -> Response {
    let winner = data.artist_conflict.lock().unwrap().take();
    if let Some(winner) = winner {
        data.artists.lock().unwrap().push(winner);
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"artists_pkey\"",
            })),
        )
            .into_response();
    }

    data.artists.lock().unwrap().push(row.clone());
    Json(Value::Array(vec![row])).into_response()
}

async fn serve_object(State(data): State<Arc<MockData>>, Path(name): Path<String>) -> Response {
    if data.stalled.lock().unwrap().contains(&name) {
        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        return StatusCode::NOT_FOUND.into_response();
    }

    let bytes = data.objects.lock().unwrap().get(&name).cloned();
    match bytes {
        Some(bytes) => bytes.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        supabase_url: base_url.trim_end_matches('/').to_string(),
        supabase_service_key: "test-service-key".to_string(),
        supabase_jwt_secret: JWT_SECRET.to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        download_log_file: None,
    }
}

pub fn build_app(upstream: &MockUpstream) -> Router {
    app_with_config(test_config(&upstream.base_url))
}

pub fn app_with_config(config: Config) -> Router {
    let supabase = SupabaseClient::new(&config);
    let verifier = TokenVerifier::new(&config);
    let state = Arc::new(AppState {
        config,
        supabase,
        verifier,
    });
    build_router(state)
}

#[derive(Serialize)]
struct TestClaims {
    sub: Uuid,
    exp: i64,
    aud: String,
}

pub fn mint_token(sub: Uuid) -> String {
    mint_with_exp(sub, (Utc::now() + Duration::hours(1)).timestamp())
}

pub fn mint_expired_token(sub: Uuid) -> String {
    mint_with_exp(sub, (Utc::now() - Duration::hours(1)).timestamp())
}

fn mint_with_exp(sub: Uuid, exp: i64) -> String {
    let claims = TestClaims {
        sub,
        exp,
        aud: "authenticated".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn post_empty(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}
