//! The resumable-upload state machine.

use tracing::{debug, info, warn};

use crate::policy::{Retriability, RetryPolicy};
use crate::transport::{ChunkOutcome, ChunkTransport};
use crate::UploadError;

/// Drives one upload session to completion.
///
/// Owns the retry counter for the lifetime of one [`drive`](Self::drive)
/// call. The counter covers the whole transfer: it is never reset, not even
/// after an intervening successful chunk, so the budget is global per upload
/// rather than per chunk.
pub struct UploadDriver<'a> {
    transport: &'a mut dyn ChunkTransport,
    policy: RetryPolicy,
}

impl<'a> UploadDriver<'a> {
    /// Creates a driver over an open upload session.
    pub fn new(transport: &'a mut dyn ChunkTransport, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Runs the upload until the server returns a video id.
    ///
    /// Transient failures (connection faults, retriable 5xx statuses) back
    /// off with full jitter and resume from the last acknowledged offset.
    /// Everything else aborts: fatal API errors propagate untouched, a
    /// completion payload without an id is [`UploadError::MissingVideoId`],
    /// and more than `max_retries` transient failures is
    /// [`UploadError::RetriesExhausted`].
    pub async fn drive(&mut self) -> Result<String, UploadError> {
        let mut retries: u32 = 0;

        loop {
            debug!(attempt = retries, "requesting next chunk transfer");

            let cause = match self.transport.send_next_chunk().await {
                Ok(ChunkOutcome::Complete(video)) => {
                    return match video.id.filter(|id| !id.is_empty()) {
                        Some(id) => {
                            info!(video_id = %id, "video uploaded");
                            Ok(id)
                        }
                        None => Err(UploadError::MissingVideoId),
                    };
                }
                Ok(ChunkOutcome::Progress { offset }) => {
                    debug!(offset, "chunk acknowledged");
                    continue;
                }
                Err(e) => match self.policy.classify(&e) {
                    Retriability::Transient => e,
                    Retriability::Fatal => return Err(UploadError::Api(e)),
                },
            };

            retries += 1;
            if retries > self.policy.max_retries {
                return Err(UploadError::RetriesExhausted {
                    attempts: retries,
                    last: cause,
                });
            }

            let delay = self.policy.delay_for_attempt(retries);
            warn!(
                error = %cause,
                attempt = retries,
                delay_secs = format_args!("{:.2}", delay.as_secs_f64()),
                "retriable upload error, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    use vidup_api::{ApiError, VideoResource};

    /// Transport that replays a scripted sequence of outcomes.
    struct ScriptedTransport {
        script: VecDeque<Result<ChunkOutcome, ApiError>>,
        calls: u32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<ChunkOutcome, ApiError>>) -> Self {
            Self {
                script: script.into(),
                calls: 0,
            }
        }
    }

    impl ChunkTransport for ScriptedTransport {
        fn send_next_chunk(
            &mut self,
        ) -> Pin<Box<dyn Future<Output = Result<ChunkOutcome, ApiError>> + Send + '_>> {
            self.calls += 1;
            let next = self.script.pop_front().unwrap_or_else(|| {
                panic!("transport called more often than scripted")
            });
            Box::pin(async move { next })
        }
    }

    fn complete(id: Option<&str>) -> Result<ChunkOutcome, ApiError> {
        Ok(ChunkOutcome::Complete(VideoResource {
            id: id.map(str::to_owned),
            snippet: None,
            status: None,
        }))
    }

    fn progress(offset: u64) -> Result<ChunkOutcome, ApiError> {
        Ok(ChunkOutcome::Progress { offset })
    }

    fn server_err(status: u16) -> Result<ChunkOutcome, ApiError> {
        Err(ApiError::Api {
            status,
            body: format!("status {status}"),
        })
    }

    #[tokio::test]
    async fn completion_returns_id_and_stops() {
        let mut transport =
            ScriptedTransport::new(vec![progress(1024), complete(Some("abc123"))]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let id = driver.drive().await.unwrap();
        assert_eq!(id, "abc123");
        drop(driver);
        assert_eq!(transport.calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn three_503s_then_success() {
        // Spec scenario: 3 retriable server errors, then the transfer lands.
        let mut transport = ScriptedTransport::new(vec![
            server_err(503),
            server_err(503),
            server_err(503),
            progress(10 * 1024 * 1024),
            complete(Some("abc123")),
        ]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let start = tokio::time::Instant::now();
        let id = driver.drive().await.unwrap();
        let slept = start.elapsed();

        assert_eq!(id, "abc123");
        drop(driver);
        assert_eq!(transport.calls, 5);
        // Three full-jitter sleeps bounded by 2^1 + 2^2 + 2^3 units.
        assert!(slept < Duration::from_secs(2 + 4 + 8));
    }

    #[tokio::test]
    async fn permanent_error_propagates_immediately() {
        let mut transport = ScriptedTransport::new(vec![Err(ApiError::Api {
            status: 403,
            body: "forbidden".into(),
        })]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let start = tokio::time::Instant::now();
        let err = driver.drive().await.unwrap_err();
        assert!(start.elapsed() < Duration::from_millis(100));

        match err {
            UploadError::Api(ApiError::Api { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        drop(driver);
        assert_eq!(transport.calls, 1);
    }

    #[tokio::test]
    async fn missing_id_aborts_without_retry() {
        let mut transport = ScriptedTransport::new(vec![complete(None)]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let err = driver.drive().await.unwrap_err();
        assert!(matches!(err, UploadError::MissingVideoId));
        drop(driver);
        assert_eq!(transport.calls, 1);
    }

    #[tokio::test]
    async fn empty_id_aborts_without_retry() {
        let mut transport = ScriptedTransport::new(vec![complete(Some(""))]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let err = driver.drive().await.unwrap_err();
        assert!(matches!(err, UploadError::MissingVideoId));
    }

    #[tokio::test(start_paused = true)]
    async fn budget_exhausts_after_eleventh_failure() {
        // 11 consecutive transient failures exceed the budget of 10; the
        // script holds nothing past the 11th call, so a 12th would panic.
        let mut transport =
            ScriptedTransport::new((0..11).map(|_| server_err(503)).collect());
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let err = driver.drive().await.unwrap_err();
        match err {
            UploadError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 11);
                assert!(matches!(last, ApiError::Api { status: 503, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        drop(driver);
        assert_eq!(transport.calls, 11);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_does_not_reset_budget() {
        // Alternate failure and progress: the 6 interleaved successes must
        // not buy back budget, so the 11th failure still exhausts it.
        let mut script = Vec::new();
        for i in 0..6 {
            script.push(server_err(500));
            script.push(progress((i + 1) * 1024));
        }
        script.extend((0..5).map(|_| server_err(502)));

        let mut transport = ScriptedTransport::new(script);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let err = driver.drive().await.unwrap_err();
        assert!(matches!(err, UploadError::RetriesExhausted { attempts: 11, .. }));
        drop(driver);
        assert_eq!(transport.calls, 17);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_after_retries_propagates() {
        let mut transport = ScriptedTransport::new(vec![
            server_err(503),
            Err(ApiError::Api {
                status: 404,
                body: "gone".into(),
            }),
        ]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let err = driver.drive().await.unwrap_err();
        assert!(matches!(
            err,
            UploadError::Api(ApiError::Api { status: 404, .. })
        ));
        drop(driver);
        assert_eq!(transport.calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_faults_are_retried() {
        let mut transport = ScriptedTransport::new(vec![
            Err(ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer",
            ))),
            complete(Some("vid-9")),
        ]);
        let mut driver = UploadDriver::new(&mut transport, RetryPolicy::default());

        let id = driver.drive().await.unwrap();
        assert_eq!(id, "vid-9");
        drop(driver);
        assert_eq!(transport.calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_fails_on_first_transient() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..Default::default()
        };
        let mut transport = ScriptedTransport::new(vec![server_err(500)]);
        let mut driver = UploadDriver::new(&mut transport, policy);

        let err = driver.drive().await.unwrap_err();
        assert!(matches!(err, UploadError::RetriesExhausted { attempts: 1, .. }));
    }
}
