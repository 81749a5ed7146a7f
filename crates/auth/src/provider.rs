//! Session bootstrap: cached credentials first, authorization grant second.

use std::io::Write;

use tracing::{info, warn};

use vidup_api::VideosClient;

use crate::AuthError;
use crate::flow::{ClientSecrets, InstalledFlow, YOUTUBE_SCOPE};
use crate::store::{CredentialStore, StoredCredentials};

/// Collects the authorization code from the user.
///
/// Seam so tests can script the grant instead of reading stdin.
pub trait GrantPrompt {
    fn obtain_code(&self, authorize_url: &str) -> Result<String, AuthError>;
}

/// Prints the consent URL and reads the pasted code from stdin.
pub struct ConsolePrompt;

impl GrantPrompt for ConsolePrompt {
    fn obtain_code(&self, authorize_url: &str) -> Result<String, AuthError> {
        println!("Visit this URL to authorize the application:");
        println!("\n  {authorize_url}\n");
        print!("Enter the authorization code: ");
        std::io::stdout().flush()?;

        let mut code = String::new();
        std::io::stdin().read_line(&mut code)?;
        Ok(code.trim().to_owned())
    }
}

/// Produces an authorized [`VideosClient`], re-running the grant when the
/// cache is missing or stale.
pub struct SessionProvider {
    store: CredentialStore,
    flow: InstalledFlow,
    prompt: Box<dyn GrantPrompt>,
    api_base_url: Option<String>,
}

impl SessionProvider {
    pub fn new(store: CredentialStore, flow: InstalledFlow, prompt: Box<dyn GrantPrompt>) -> Self {
        Self {
            store,
            flow,
            prompt,
            api_base_url: None,
        }
    }

    /// Builds a provider from `CLIENT_SECRETS_FILE` and `CREDENTIALS_FILE`.
    pub fn from_env() -> Result<Self, AuthError> {
        let secrets_path = std::env::var("CLIENT_SECRETS_FILE")
            .map_err(|_| AuthError::MissingEnv("CLIENT_SECRETS_FILE"))?;
        let cache_path = std::env::var("CREDENTIALS_FILE")
            .map_err(|_| AuthError::MissingEnv("CREDENTIALS_FILE"))?;

        let secrets = ClientSecrets::from_file(secrets_path)?;
        Ok(Self::new(
            CredentialStore::new(cache_path),
            InstalledFlow::new(secrets),
            Box::new(ConsolePrompt),
        ))
    }

    /// Points issued clients at a different API root (tests).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    fn client_for(&self, token: &str) -> Result<VideosClient, AuthError> {
        let mut client = VideosClient::new(token)?;
        if let Some(url) = &self.api_base_url {
            client = client.with_base_url(url.clone());
        }
        Ok(client)
    }

    /// Returns a client that has passed an authenticated probe.
    ///
    /// Cached credentials are probed first; on failure the cache is cleared
    /// and one authorization grant runs. The fresh session is probed exactly
    /// once, so a broken grant surfaces as [`AuthError::Bootstrap`] instead
    /// of looping.
    pub async fn obtain_session(&self) -> Result<VideosClient, AuthError> {
        if let Some(cached) = self.store.load()? {
            let client = self.client_for(&cached.token)?;
            match client.probe().await {
                Ok(()) => {
                    info!("cached credentials are valid");
                    return Ok(client);
                }
                Err(e) => {
                    warn!(error = %e, "cached credentials rejected, re-authorizing");
                    self.store.clear()?;
                }
            }
        }

        let code = self.prompt.obtain_code(&self.flow.authorize_url())?;
        let tokens = self.flow.exchange_code(&code).await?;

        let secrets = self.flow.secrets();
        self.store.save(&StoredCredentials {
            token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token,
            token_uri: Some(secrets.token_uri.clone()),
            client_id: Some(secrets.client_id.clone()),
            client_secret: Some(secrets.client_secret.clone()),
            scopes: vec![YOUTUBE_SCOPE.to_owned()],
        })?;

        let client = self.client_for(&tokens.access_token)?;
        client.probe().await.map_err(AuthError::Bootstrap)?;
        info!("authorization grant complete");
        Ok(client)
    }
}
