//! Installed-app authorization grant.

use std::path::Path;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::debug;

use crate::AuthError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Out-of-band redirect: the provider shows the code for manual copy-paste.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// The scope granting full channel access, uploads included.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

/// OAuth client registration, read from a client-secrets JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: ClientSecrets,
}

impl ClientSecrets {
    /// Reads the `installed` section of a downloaded client-secrets file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path)?;
        let file: SecretsFile = serde_json::from_str(&raw)?;
        Ok(file.installed)
    }
}

/// Tokens returned by the exchange endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// One manual authorization grant: print a URL, collect the code, exchange
/// it for tokens.
pub struct InstalledFlow {
    secrets: ClientSecrets,
    http: reqwest::Client,
    token_url: String,
}

impl InstalledFlow {
    pub fn new(secrets: ClientSecrets) -> Self {
        let token_url = secrets.token_uri.clone();
        Self {
            secrets,
            http: reqwest::Client::new(),
            token_url,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// The consent URL the user must visit in a browser.
    pub fn authorize_url(&self) -> String {
        let client_id = utf8_percent_encode(&self.secrets.client_id, NON_ALPHANUMERIC);
        let redirect = utf8_percent_encode(OOB_REDIRECT_URI, NON_ALPHANUMERIC);
        let scope = utf8_percent_encode(YOUTUBE_SCOPE, NON_ALPHANUMERIC);
        format!(
            "{AUTH_URL}?response_type=code&client_id={client_id}\
             &redirect_uri={redirect}&scope={scope}&access_type=offline"
        )
    }

    /// Exchanges the pasted authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        debug!(token_url = %self.token_url, "exchanging authorization code");
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", &self.secrets.client_id),
                ("client_secret", &self.secrets.client_secret),
                ("redirect_uri", OOB_REDIRECT_URI),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(vidup_api::ApiError::Http)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(vidup_api::ApiError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let tokens: TokenResponse = resp
            .json()
            .await
            .map_err(vidup_api::ApiError::Http)?;
        Ok(tokens)
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }
}
