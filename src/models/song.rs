use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A song row as served by the hosted database, ordered by track number
/// when listed for an album. `audio_url` points into object storage and
/// may be null for rows whose upload never completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub track_number: Option<i32>,
    #[serde(default)]
    pub audio_url: Option<String>,
}
