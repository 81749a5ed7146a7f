//! The on-disk video record.
//!
//! One JSON file describes one video: where the source file lives, the
//! metadata to publish, and the remote video id once an upload has
//! succeeded. The record doubles as upsert state: a present id means
//! "update metadata", an absent one means "upload". Fields this crate does
//! not model are carried through saves untouched, so the record can hold
//! data for other tooling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors reading or writing a record file.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The `metadata` section of a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMetadata {
    /// Video resource body sent to the API (snippet, status, ...).
    pub video: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One video record, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    /// Remote video id; set after the first successful upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Path to the source video file, resolved relative to the record.
    pub file: String,
    pub metadata: RecordMetadata,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VideoRecord {
    /// Loads a record from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let record: Self = serde_json::from_str(&raw)?;
        debug!(path = %path.as_ref().display(), has_id = record.remote_id().is_some(), "record loaded");
        Ok(record)
    }

    /// Rewrites the record at `path`, preserving unmodeled fields.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        debug!(path = %path.as_ref().display(), "record saved");
        Ok(())
    }

    /// The remote video id, treating an empty string as unset.
    pub fn remote_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Resolves the source file path against the record's own location.
    ///
    /// Absolute paths pass through; relative ones are joined onto the
    /// directory containing the record file.
    pub fn source_path(&self, record_path: &Path) -> PathBuf {
        let file = Path::new(&self.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            record_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(file)
        }
    }

    /// The `snippet` section of the video metadata, if present.
    pub fn snippet(&self) -> Option<&serde_json::Value> {
        self.metadata.video.get("snippet")
    }
}
