//! HTTP client for the IYS consent registry
//!
//! Authenticates with an OAuth2 password grant and caches the bearer token
//! in the client instance. The token is requested lazily, the first time a
//! call needs it, and is not refreshed during a run.

use super::models::{
    ConsentPayload, PasswordGrantRequest, StatusResponse, SubmitResponse, TokenResponse,
};
use super::traits::RegistryClient;
use crate::config::{secret_string, RegistryConfig, SecretString};
use crate::domain::{ConsentRecord, IysError, RegistryError, RequestId, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::sync::Mutex;

/// Registry client backed by reqwest
///
/// # Example
///
/// ```no_run
/// use iys_bulk::adapters::iys::{IysClient, RegistryClient};
/// use iys_bulk::config::load_config;
///
/// # async fn example() -> iys_bulk::domain::Result<()> {
/// let config = load_config("iys.toml")?;
/// let client = IysClient::new(config.registry)?;
/// client.authenticate().await?;
/// # Ok(())
/// # }
/// ```
pub struct IysClient {
    /// HTTP client for making requests
    client: Client,

    /// Registry configuration
    config: RegistryConfig,

    /// Bearer token, written by the first successful authentication
    token: Mutex<Option<SecretString>>,
}

impl IysClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!(
                base_url = %config.base_url,
                "TLS certificate verification is DISABLED for the registry; use only against test environments"
            );
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| IysError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// Whether a bearer token is cached
    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    async fn cached_bearer(&self) -> Option<String> {
        self.token
            .lock()
            .await
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Authorization header value, authenticating first if needed
    async fn bearer_header(&self) -> Result<String> {
        if let Some(header) = self.cached_bearer().await {
            return Ok(header);
        }

        self.authenticate().await?;

        self.cached_bearer().await.ok_or_else(|| {
            RegistryError::AuthenticationFailed(
                "no token cached after authentication".to_string(),
            )
            .into()
        })
    }
}

#[async_trait]
impl RegistryClient for IysClient {
    async fn authenticate(&self) -> Result<()> {
        let username = self.config.username.as_deref().ok_or_else(|| {
            IysError::Configuration("registry.username is required".to_string())
        })?;
        let password = self.config.password.as_ref().ok_or_else(|| {
            IysError::Configuration("registry.password is required".to_string())
        })?;

        let token_url = self.config.token_url();
        tracing::debug!(token_url = %token_url, username = %username, "Requesting access token");

        let form = PasswordGrantRequest {
            grant_type: "password",
            username,
            password: password.expose_secret().as_ref(),
        };

        let response = self
            .client
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                RegistryError::AuthenticationFailed(format!("token request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "Token exchange rejected");
            return Err(RegistryError::AuthenticationFailed(format!(
                "token request failed with status {status}: {body}"
            ))
            .into());
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            RegistryError::AuthenticationFailed(format!(
                "token response has no access_token ({e}): {body}"
            ))
        })?;

        *self.token.lock().await = Some(secret_string(token.access_token));

        tracing::info!("Successfully obtained access token");
        Ok(())
    }

    async fn submit(&self, records: &[ConsentRecord]) -> Result<RequestId> {
        let bearer = self.bearer_header().await?;
        let payload: Vec<ConsentPayload<'_>> = records.iter().map(ConsentPayload::from).collect();

        tracing::info!(recipients = records.len(), "Submitting consent request");

        let response = self
            .client
            .post(self.config.consent_request_url())
            .header(AUTHORIZATION, bearer)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                RegistryError::ConnectionFailed(format!("consent request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            RegistryError::ConnectionFailed(format!("failed to read consent response: {e}"))
        })?;

        if !status.is_success() {
            return Err(RegistryError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: SubmitResponse = serde_json::from_str(&body).map_err(|e| {
            RegistryError::UnexpectedResponse(format!(
                "consent response is not valid JSON ({e}): {body}"
            ))
        })?;

        let request_id = parsed
            .request_id_text()
            .and_then(|id| RequestId::new(id).ok())
            .ok_or_else(|| {
                RegistryError::UnexpectedResponse(format!(
                    "consent response did not include a requestId: {body}"
                ))
            })?;

        tracing::info!(request_id = %request_id, "Request accepted");
        Ok(request_id)
    }

    async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusResponse> {
        let bearer = self.bearer_header().await?;

        let response = self
            .client
            .get(self.config.status_url(request_id.as_str()))
            .header(AUTHORIZATION, bearer)
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed(format!("status request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            RegistryError::ConnectionFailed(format!("failed to read status response: {e}"))
        })?;

        if !status.is_success() {
            return Err(RegistryError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|_| {
            RegistryError::UnexpectedResponse(format!(
                "status response for {request_id} has an unexpected shape: {body}"
            ))
            .into()
        })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
