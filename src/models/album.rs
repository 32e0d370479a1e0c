use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An album row as served by the hosted database. Read-only for this
/// service; the publishing flows that create and update albums live
/// elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub is_private: bool,
    pub artist_id: Uuid,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
