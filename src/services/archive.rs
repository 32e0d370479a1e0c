use crate::error::{AppError, Result};
use crate::models::Song;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::io::{Cursor, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Per-song fetch timeout. Covers connect, redirects, and body read.
pub const SONG_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Wall-clock budget for the whole archive (fetch plus assembly).
pub const ALBUM_FETCH_BUDGET: Duration = Duration::from_secs(600);

/// In-flight audio fetches per album request.
pub const MAX_CONCURRENT_FETCHES: usize = 10;

/// A fetched body must be strictly larger than this to count as audio.
pub const MIN_AUDIO_BYTES: usize = 1000;

/// Response chunk size for the finished archive.
pub const ARCHIVE_CHUNK_SIZE: usize = 256 * 1024;

/// Deflate level for archive entries.
pub const COMPRESSION_LEVEL: i64 = 6;

/// Fetched entries queued between the fetch and assembly stages.
pub const ENTRY_QUEUE_DEPTH: usize = 4;

const MAX_TITLE_CHARS: usize = 50;
const REDIRECT_LIMIT: usize = 10;

/// One file destined for the archive. Exists only for songs whose audio
/// actually fetched; skipped songs leave no placeholder.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub filename: String,
    pub data: Bytes,
}

/// Fetches every song's audio and assembles the finished ZIP buffer.
///
/// Fetches run 10 at a time but complete in track order. Songs that cannot
/// be fetched are logged and skipped; the archive simply omits them. Zero
/// usable songs or an exceeded time budget is an error, never an empty
/// archive.
pub async fn build_album_archive(songs: &[Song]) -> Result<Vec<u8>> {
    build_album_archive_with_budget(songs, ALBUM_FETCH_BUDGET).await
}

/// [`build_album_archive`] with the wall-clock budget made explicit.
pub async fn build_album_archive_with_budget(
    songs: &[Song],
    budget: Duration,
) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(SONG_FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
        .build()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build fetch client: {}", e)))?;

    let (tx, mut rx) = mpsc::channel::<ArchiveEntry>(ENTRY_QUEUE_DEPTH);
    let assembler = tokio::task::spawn_blocking(move || assemble_entries(&mut rx));

    let total = songs.len();
    let songs = songs.to_vec();
    let pipeline = async move {
        {
            // Each fetch owns its song and a handle to the shared client;
            // the stream carries no borrows.
            let mut fetches = stream::iter(songs.into_iter().enumerate())
                .map(|(idx, song)| {
                    let client = client.clone();
                    async move { fetch_song(&client, &song, idx + 1).await }
                })
                .buffered(MAX_CONCURRENT_FETCHES);

            while let Some(fetched) = fetches.next().await {
                if let Some(entry) = fetched {
                    // The assembler hanging up means it failed; its error
                    // is picked up below.
                    if tx.send(entry).await.is_err() {
                        break;
                    }
                }
            }
        }
        drop(tx);

        match assembler.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                "Archive task failed: {}",
                e
            ))),
        }
    };

    let (buffer, count) = tokio::time::timeout(budget, pipeline)
        .await
        .map_err(|_| AppError::Upstream("Album download timed out".to_string()))??;

    if count == 0 {
        return Err(AppError::Upstream(
            "no songs could be fetched for this album".to_string(),
        ));
    }

    tracing::info!(
        "Album archive built: {} of {} songs, {} bytes",
        count,
        total,
        buffer.len()
    );

    Ok(buffer)
}

/// Emits the finished archive as fixed-size chunks off one shared buffer.
pub fn archive_stream(
    buffer: Vec<u8>,
) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> {
    let buffer = Bytes::from(buffer);
    async_stream::stream! {
        let mut offset = 0;
        while offset < buffer.len() {
            let end = (offset + ARCHIVE_CHUNK_SIZE).min(buffer.len());
            yield Ok(buffer.slice(offset..end));
            offset = end;
        }
        tracing::info!("Finished streaming archive ({} bytes)", buffer.len());
    }
}

async fn fetch_song(client: &reqwest::Client, song: &Song, position: usize) -> Option<ArchiveEntry> {
    let url = match song.audio_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            tracing::warn!("Skipping song without audio URL: {}", song.title);
            return None;
        }
    };

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch song '{}': {}", song.title, e);
            return None;
        }
    };

    if response.status() != reqwest::StatusCode::OK {
        tracing::warn!(
            "Failed to fetch song '{}': status {}",
            song.title,
            response.status()
        );
        return None;
    }

    let data = match response.bytes().await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to read song '{}': {}", song.title, e);
            return None;
        }
    };

    if data.len() <= MIN_AUDIO_BYTES {
        tracing::warn!(
            "Skipping song '{}': body too small ({} bytes)",
            song.title,
            data.len()
        );
        return None;
    }

    let filename = entry_filename(song, position);
    tracing::info!("Fetched song '{}' ({} bytes) as {}", song.title, data.len(), filename);

    Some(ArchiveEntry {
        filename,
        data,
    })
}

/// Blocking stage: drains the entry channel and writes the ZIP into memory.
/// An entry whose filename repeats replaces the earlier data in place, so
/// the archive never holds two files with one name.
fn assemble_entries(rx: &mut mpsc::Receiver<ArchiveEntry>) -> Result<(Vec<u8>, usize)> {
    let mut staged: Vec<ArchiveEntry> = Vec::new();
    while let Some(entry) = rx.blocking_recv() {
        match staged.iter_mut().find(|e| e.filename == entry.filename) {
            Some(existing) => *existing = entry,
            None => staged.push(entry),
        }
    }

    let count = staged.len();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for entry in staged {
        writer
            .start_file(entry.filename.as_str(), options.clone())
            .map_err(|e| AppError::Archive(format!("Failed to start archive entry: {}", e)))?;
        writer
            .write_all(&entry.data)
            .map_err(|e| AppError::Archive(format!("Failed to write archive entry: {}", e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| AppError::Archive(format!("Failed to finish archive: {}", e)))?;

    Ok((cursor.into_inner(), count))
}

/// `NN - Title.mp3`, with the track number falling back to the song's
/// 1-based position when the stored number is null or not positive.
fn entry_filename(song: &Song, position: usize) -> String {
    let track = song
        .track_number
        .filter(|n| *n > 0)
        .unwrap_or(position as i32);
    let safe_title = sanitize_title(&song.title);
    if safe_title.is_empty() {
        format!("{:02} - track_{}.mp3", track, track)
    } else {
        format!("{:02} - {}.mp3", track, safe_title)
    }
}

/// Keeps alphanumerics, space, hyphen, and underscore from the first 50
/// characters, then drops surrounding whitespace.
fn sanitize_title(title: &str) -> String {
    let filtered: String = title
        .chars()
        .take(MAX_TITLE_CHARS)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    filtered.trim().to_string()
}
