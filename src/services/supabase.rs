use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Album, Artist, Song};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

const DB_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the hosted database (PostgREST row filters).
///
/// All requests carry the service key, which bypasses row-level security;
/// access checks happen in the handlers that call this.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    service_key: String,
    client: Client,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
            client: Client::new(),
        }
    }

    fn rest_url(&self, path_and_query: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path_and_query)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<Vec<T>> {
        let url = self.rest_url(path_and_query);
        tracing::debug!("Querying database: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .timeout(DB_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            tracing::error!("Database API error: {} - {}", status, snippet);
            return Err(AppError::Database(format!(
                "API returned status: {}",
                status
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Database(format!("Failed to parse response: {}", e)))
    }

    pub async fn fetch_album(&self, album_id: Uuid) -> Result<Option<Album>> {
        let rows = self
            .fetch_rows::<Album>(&format!("albums?id=eq.{}&select=*&limit=1", album_id))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Songs for an album, ordered by track number on the server side.
    pub async fn fetch_songs(&self, album_id: Uuid) -> Result<Vec<Song>> {
        self.fetch_rows(&format!(
            "songs?album_id=eq.{}&select=*&order=track_number.asc",
            album_id
        ))
        .await
    }

    pub async fn fetch_artist(&self, artist_id: Uuid) -> Result<Option<Artist>> {
        let rows = self
            .fetch_rows::<Artist>(&format!("artists?id=eq.{}&select=*&limit=1", artist_id))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Inserts an artist row and returns it. Pass only the columns to set;
    /// the database defaults the rest.
    pub async fn insert_artist<T: Serialize>(&self, row: &T) -> Result<Artist> {
        let url = self.rest_url("artists");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .timeout(DB_REQUEST_TIMEOUT)
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            tracing::error!("Database insert error: {} - {}", status, snippet);
            return Err(AppError::Database(format!(
                "API returned status: {}",
                status
            )));
        }

        let mut rows: Vec<Artist> = response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("Failed to parse response: {}", e)))?;

        if rows.is_empty() {
            return Err(AppError::Database("Insert returned no rows".to_string()));
        }
        Ok(rows.remove(0))
    }
}
