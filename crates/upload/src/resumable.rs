//! Production transport over the resumable-upload HTTP protocol.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, RANGE};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use vidup_api::{ApiError, VideoResource};

use crate::DEFAULT_CHUNK_SIZE;
use crate::transport::{ChunkOutcome, ChunkTransport};

/// One resumable upload session against a server-issued upload URL.
///
/// Each attempt PUTs the chunk at the acknowledged offset with a
/// `Content-Range` header. The server answers 308 with a `Range` header
/// while bytes remain, and a final 2xx with the video resource once the
/// object is materialized. The session lives in memory only; a crashed
/// process abandons it and starts over.
#[derive(Debug)]
pub struct ResumableUpload {
    http: reqwest::Client,
    upload_url: String,
    source: PathBuf,
    total_len: u64,
    offset: u64,
    chunk_size: u64,
}

impl ResumableUpload {
    /// Opens a session for `source` against `upload_url`.
    pub async fn open(
        upload_url: impl Into<String>,
        source: impl Into<PathBuf>,
    ) -> Result<Self, ApiError> {
        let source = source.into();
        let total_len = tokio::fs::metadata(&source).await?.len();

        // 308 is the protocol's resume signal, not a redirect; never follow.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            upload_url: upload_url.into(),
            source,
            total_len,
            offset: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Overrides the chunk size (must stay 256 KiB-aligned for real uploads).
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Last server-acknowledged byte offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Total length of the source file in bytes.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    async fn read_chunk(&self) -> Result<Vec<u8>, ApiError> {
        let mut file = tokio::fs::File::open(&self.source).await?;
        file.seek(std::io::SeekFrom::Start(self.offset)).await?;

        let want = self.chunk_size.min(self.total_len - self.offset) as usize;
        let mut buf = vec![0u8; want];
        file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn put_chunk(&mut self) -> Result<ChunkOutcome, ApiError> {
        let chunk = self.read_chunk().await?;
        let content_range = if chunk.is_empty() {
            // Nothing left to send: query the session state instead.
            format!("bytes */{}", self.total_len)
        } else {
            format!(
                "bytes {}-{}/{}",
                self.offset,
                self.offset + chunk.len() as u64 - 1,
                self.total_len
            )
        };

        debug!(range = %content_range, "sending chunk");
        let resp = self
            .http
            .put(&self.upload_url)
            .header(CONTENT_RANGE, content_range)
            .body(chunk)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::PERMANENT_REDIRECT {
            // 308 Resume Incomplete: Range carries the last byte the server
            // holds, e.g. `bytes=0-524287`.
            let acked = resp
                .headers()
                .get(RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_range_end)
                .map(|end| end + 1)
                .unwrap_or(0);
            // Offset never decreases, whatever the server claims, and an
            // over-ack cannot push it past the end of the file.
            self.offset = self.offset.max(acked).min(self.total_len);
            return Ok(ChunkOutcome::Progress {
                offset: self.offset,
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let video: VideoResource = serde_json::from_slice(&body)?;
        Ok(ChunkOutcome::Complete(video))
    }
}

impl ChunkTransport for ResumableUpload {
    fn send_next_chunk(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkOutcome, ApiError>> + Send + '_>> {
        Box::pin(self.put_chunk())
    }
}

/// Parses the end byte out of a `Range: bytes=0-N` header value.
fn parse_range_end(value: &str) -> Option<u64> {
    value.rsplit('-').next()?.trim().parse().ok()
}
