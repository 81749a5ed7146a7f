//! Resumable chunked upload with bounded retry and full-jitter backoff.
//!
//! The driver owns the upload state machine: it requests chunk transfers
//! through a [`ChunkTransport`], classifies failures with a [`RetryPolicy`],
//! sleeps through transient ones, and terminates on the first completion
//! response carrying a video id. Fatal failures and an exhausted retry
//! budget surface as [`UploadError`] values; the caller decides how loudly
//! to die.

mod driver;
mod policy;
mod resumable;
mod transport;

pub use driver::UploadDriver;
pub use policy::{RetryPolicy, Retriability};
pub use resumable::ResumableUpload;
pub use transport::{ChunkOutcome, ChunkTransport};

/// Default chunk size: 8 MiB.
///
/// Must stay a multiple of 256 KiB; the upload endpoint rejects unaligned
/// intermediate chunks. Larger chunks mean fewer round-trips on reliable
/// links, smaller ones recover faster on flaky ones.
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Errors produced while driving an upload to completion.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// A fatal API or transport failure, propagated untouched.
    #[error(transparent)]
    Api(#[from] vidup_api::ApiError),

    /// The server reported success but the completion payload carried no id.
    #[error("upload finished but the completion response carried no video id")]
    MissingVideoId,

    /// The bounded retry budget ran out.
    #[error("no longer attempting to retry after {attempts} transient failures")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: vidup_api::ApiError,
    },
}
