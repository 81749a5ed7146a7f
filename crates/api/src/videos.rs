//! Async HTTP client for the videos endpoints.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, LOCATION};

use crate::error::ApiError;
use crate::types::{VideoListResponse, VideoResource};

/// Authenticated client for the Data API, bound to one access token.
#[derive(Debug)]
pub struct VideosClient {
    http: reqwest::Client,
    base_url: String,
    upload_base_url: String,
}

impl VideosClient {
    /// Creates a new client with Bearer authentication.
    pub fn new(access_token: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|_| ApiError::InvalidToken)?,
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: crate::API_BASE_URL.to_string(),
            upload_base_url: crate::UPLOAD_BASE_URL.to_string(),
        })
    }

    /// Points both endpoint roots at `url` (for tests and mock servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.clone();
        self.upload_base_url = url;
        self
    }

    /// Cheap read-only call used to validate the session's credentials.
    ///
    /// Mirrors listing the most-popular chart: the smallest request that
    /// still exercises authentication end to end.
    pub async fn probe(&self) -> Result<(), ApiError> {
        let url = format!("{}/videos", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("chart", "mostPopular"),
                ("maxResults", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // Parse to confirm the response is the expected list shape.
        let body = resp.bytes().await?;
        let _: VideoListResponse = serde_json::from_slice(&body)?;
        Ok(())
    }

    /// Patches the snippet of an already-uploaded video.
    ///
    /// Single synchronous call, no retry — failures propagate to the caller.
    pub async fn update_video(
        &self,
        video_id: &str,
        snippet: &serde_json::Value,
    ) -> Result<VideoResource, ApiError> {
        let url = format!("{}/videos", self.base_url);
        let body = serde_json::json!({ "id": video_id, "snippet": snippet });

        let resp = self
            .http
            .put(&url)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Initiates a resumable upload session for one video.
    ///
    /// `metadata` is the full video bundle from the record (at least a
    /// `snippet`); its top-level keys become the `part` parameter. Returns
    /// the server-issued upload URL that chunk transfers are sent to.
    pub async fn begin_resumable_upload(
        &self,
        metadata: &serde_json::Value,
        content_length: u64,
    ) -> Result<String, ApiError> {
        let url = format!("{}/videos", self.upload_base_url);
        let parts = metadata
            .as_object()
            .map(|m| m.keys().cloned().collect::<Vec<_>>().join(","))
            .unwrap_or_else(|| "snippet".to_string());

        let resp = self
            .http
            .post(&url)
            .query(&[("uploadType", "resumable"), ("part", parts.as_str())])
            .header("X-Upload-Content-Type", "video/*")
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(metadata)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        resp.headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(ApiError::MissingUploadUrl)
    }
}
