//! YouTube Data API v3 client surface.
//!
//! Covers the three calls the upsert flow needs: the cheap read-only probe
//! used to validate cached credentials, the single-shot metadata update, and
//! the initiation of a resumable upload session. Chunk transfer itself lives
//! in `vidup-upload`.

mod error;
mod types;
mod videos;

pub use error::ApiError;
pub use types::{VideoListResponse, VideoResource};
pub use videos::VideosClient;

/// Base URL for plain Data API calls (videos.list, videos.update).
pub const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Base URL for media upload calls (videos.insert with uploadType=resumable).
pub const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/youtube/v3";
