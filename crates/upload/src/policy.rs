//! Retry budget and failure classification.

use std::time::Duration;

use vidup_api::ApiError;

/// Exponent cap for the backoff ceiling, to keep `1 << exp` well-defined
/// even with an oversized budget.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Whether a failed chunk attempt is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retriability {
    Transient,
    Fatal,
}

/// Immutable retry configuration passed into the driver.
///
/// Modeled as explicit state rather than module constants so tests can vary
/// the budget and the classification rules.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of transient failures tolerated per upload.
    pub max_retries: u32,
    /// API status codes treated as transient server faults.
    pub retriable_statuses: Vec<u16>,
    /// One backoff time unit; delays are sampled in multiples of this.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retriable_statuses: vec![500, 502, 503, 504],
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Classifies a chunk-attempt failure.
    ///
    /// Connection-level faults are always transient; API errors are transient
    /// only for the configured status codes. Everything else is fatal and
    /// must propagate untouched.
    pub fn classify(&self, err: &ApiError) -> Retriability {
        match err {
            ApiError::Http(_) | ApiError::Io(_) => Retriability::Transient,
            ApiError::Api { status, .. } if self.retriable_statuses.contains(status) => {
                Retriability::Transient
            }
            _ => Retriability::Fatal,
        }
    }

    /// Full-jitter backoff delay for a 1-based attempt number.
    ///
    /// Sampled uniformly from `[0, 2^attempt)` backoff units.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.min(MAX_BACKOFF_EXPONENT);
        let ceiling = (1u64 << exp) as f64 * self.backoff_unit.as_secs_f64();
        Duration::from_secs_f64(rand::random::<f64>() * ceiling)
    }
}
