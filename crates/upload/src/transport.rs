//! Transport seam between the driver and the wire.

use std::future::Future;
use std::pin::Pin;

use vidup_api::{ApiError, VideoResource};

/// Outcome of one chunk-transfer attempt.
///
/// Exactly one outcome per attempt; `Complete` terminates the upload loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// The server acknowledged bytes up to `offset`; more chunks remain.
    Progress { offset: u64 },
    /// The upload is fully materialized; the final video resource.
    Complete(VideoResource),
}

/// One resumable upload session on the wire.
///
/// Implementations hold the server-issued session handle and the source
/// file, and resume each attempt from the last acknowledged byte offset.
/// Using a trait keeps the driver decoupled from HTTP and testable with
/// scripted mocks.
pub trait ChunkTransport: Send {
    /// Transfers the next chunk, resuming from the acknowledged offset.
    fn send_next_chunk(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkOutcome, ApiError>> + Send + '_>>;
}
