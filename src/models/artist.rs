use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An artist profile row. The id doubles as the auth subject: the hosted
/// auth service issues tokens whose `sub` is the artist's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub is_verified: bool,
}

/// Insert payload for a fresh artist profile row.
#[derive(Debug, Clone, Serialize)]
pub struct NewArtist {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub genre: String,
    pub style: String,
    pub bio: String,
    pub avatar_url: String,
    pub cover_url: String,
    pub followers_count: i64,
    pub is_verified: bool,
}

/// Minimal insert payload used when only the subject id and a display name
/// are known. Every other column takes its database default.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistStub {
    pub id: Uuid,
    pub name: String,
}

pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Body of the post-signup profile initialization call. The whole body and
/// every field are optional; blanks fall back to sensible defaults.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct InitArtistProfileRequest {
    #[validate(length(max = 120))]
    pub artist_name: Option<String>,
    #[validate(length(max = 120))]
    pub artist_slug: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub genre: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct EnsureArtistRequest {
    #[validate(length(max = 120))]
    pub artist_name: Option<String>,
}
