//! Local track library backed by a JSON file.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Artist name stored for tracks without artist metadata.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Library errors.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to read library file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid library file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A row of the track table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub track_ref: String,
    pub title: String,
    pub artist_name: String,
    pub album_title: Option<String>,
}

impl TrackRecord {
    /// Title to show in lists.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.track_ref
        } else {
            &self.title
        }
    }
}

/// Lookup of track rows by track reference.
#[async_trait]
pub trait TrackStore: Send + Sync {
    async fn track_info(&self, track_ref: &str) -> Result<Option<TrackRecord>, LibraryError>;
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    tracks: Vec<LibraryEntry>,
}

#[derive(Debug, Deserialize)]
struct LibraryEntry {
    path: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
}

impl From<LibraryEntry> for TrackRecord {
    fn from(entry: LibraryEntry) -> Self {
        let artist_name = entry
            .artist
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| String::from(UNKNOWN_ARTIST));

        Self {
            title: entry.title.unwrap_or_default(),
            track_ref: entry.path,
            artist_name,
            album_title: entry.album.filter(|a| !a.is_empty()),
        }
    }
}

/// In-memory index over a JSON library file.
#[derive(Debug, Default)]
pub struct JsonLibrary {
    order: Vec<String>,
    tracks: HashMap<String, TrackRecord>,
}

impl JsonLibrary {
    /// Load the library from disk.
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let contents = std::fs::read_to_string(path)?;
        let library = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded {} tracks from {}",
            library.order.len(),
            path.display()
        );
        Ok(library)
    }

    /// Parse a library document.
    pub fn from_json(contents: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile = serde_json::from_str(contents)?;
        Ok(Self::from_records(
            file.tracks.into_iter().map(TrackRecord::from),
        ))
    }

    /// Build the index from already decoded records; later duplicates win.
    pub fn from_records(records: impl IntoIterator<Item = TrackRecord>) -> Self {
        let mut library = Self::default();
        for record in records {
            if library
                .tracks
                .insert(record.track_ref.clone(), record.clone())
                .is_none()
            {
                library.order.push(record.track_ref);
            }
        }
        library
    }

    /// Records in file order.
    pub fn tracks(&self) -> Vec<TrackRecord> {
        self.order
            .iter()
            .filter_map(|r| self.tracks.get(r).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[async_trait]
impl TrackStore for JsonLibrary {
    async fn track_info(&self, track_ref: &str) -> Result<Option<TrackRecord>, LibraryError> {
        Ok(self.tracks.get(track_ref).cloned())
    }
}
