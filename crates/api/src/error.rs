//! API error taxonomy.

/// Errors from the remote video platform API.
///
/// `Http` and `Io` are connection-level faults; `Api` carries the remote
/// status code and body verbatim. The retry policy in `vidup-upload`
/// classifies these into transient and fatal; this crate only reports them.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no upload URL in resumable session response")]
    MissingUploadUrl,

    #[error("invalid access token")]
    InvalidToken,
}
