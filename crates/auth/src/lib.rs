//! OAuth credential cache and session bootstrap.
//!
//! The provider tries cached credentials first, validates them with a cheap
//! API probe, and falls back to an installed-app authorization grant when
//! the cache is missing or stale. A freshly granted session is probed once
//! more before it is handed out, so callers always receive a client that
//! has made at least one successful authenticated call.

mod flow;
mod provider;
mod store;

pub use flow::{ClientSecrets, InstalledFlow, TokenResponse};
pub use provider::{ConsolePrompt, GrantPrompt, SessionProvider};
pub use store::{CredentialStore, StoredCredentials};

/// Errors raised while obtaining an authorized session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] vidup_api::ApiError),

    /// A required environment variable is unset.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// The probe failed even on credentials obtained this run.
    #[error("session probe failed after re-authorization: {0}")]
    Bootstrap(#[source] vidup_api::ApiError),
}
