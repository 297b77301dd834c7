//! HTTP client for OpenAI-compatible provider APIs
//!
//! Shared by the embedder and the answer synthesizer:
//! - bearer authentication from a [`Credential`]
//! - a fixed request timeout, surfaced as a service error on expiry
//! - status mapping: 401/403 are authentication failures, everything else
//!   that is not a success is a service failure
//!
//! No retries.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::{Credential, ProviderConfig};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::errors::{RagError, Result};
use crate::synthesis::{AnswerSynthesizer, OpenAIChatSynthesizer};

/// Provider name used in error messages and logs
pub const PROVIDER: &str = "OpenAI";

/// Thin JSON-over-HTTP client
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    api_base: String,
    credential: Credential,
}

impl ProviderClient {
    /// Create a client for `api_base` with the given request timeout
    pub fn new(api_base: &str, credential: Credential, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::service(PROVIDER, format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credential,
        })
    }

    /// Create a client from provider configuration
    pub fn from_config(config: &ProviderConfig, credential: Credential) -> Result<Self> {
        Self::new(
            &config.api_base,
            credential,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Base URL without trailing slash
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// POST `body` as JSON to `{api_base}/{path}` and decode the response
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_base, path);
        debug!(provider = PROVIDER, %url, "sending request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                transport_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, %status, "API error");
            return Err(status_error(status, &body));
        }

        response.json::<R>().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::service(PROVIDER, format!("failed to parse response: {}", e))
        })
    }

    /// GET `{api_base}/models` and report whether the credential is accepted
    pub async fn check_access(&self) -> Result<()> {
        let url = format!("{}/models", self.api_base);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.credential.expose())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, &body))
        }
    }
}

/// Creates the external components once a credential is available
pub trait ProviderFactory: Send + Sync {
    fn embedder(&self, credential: &Credential) -> Result<Arc<dyn Embedder>>;
    fn synthesizer(&self, credential: &Credential) -> Result<Arc<dyn AnswerSynthesizer>>;
}

/// Factory for the hosted OpenAI-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAIFactory {
    config: ProviderConfig,
}

impl OpenAIFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for OpenAIFactory {
    fn embedder(&self, credential: &Credential) -> Result<Arc<dyn Embedder>> {
        let client = ProviderClient::from_config(&self.config, credential.clone())?;
        let embedder = OpenAIEmbedder::new(client, self.config.embedding_model.clone());
        Ok(match self.config.embedding_dimensions {
            Some(dimensions) => Arc::new(embedder.with_dimensions(dimensions)),
            None => Arc::new(embedder),
        })
    }

    fn synthesizer(&self, credential: &Credential) -> Result<Arc<dyn AnswerSynthesizer>> {
        let client = ProviderClient::from_config(&self.config, credential.clone())?;
        Ok(Arc::new(
            OpenAIChatSynthesizer::new(client, self.config.chat_model.clone())
                .with_temperature(self.config.temperature),
        ))
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Map a non-success HTTP status and body to an error
pub fn status_error(status: StatusCode, body: &str) -> RagError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    let message = format!("API returned {}: {}", status, detail);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RagError::authentication(PROVIDER, message)
        }
        _ => RagError::service(PROVIDER, message),
    }
}

fn transport_error(e: &reqwest::Error) -> RagError {
    if e.is_timeout() {
        RagError::service(PROVIDER, format!("request timed out: {}", e))
    } else {
        RagError::service(PROVIDER, format!("request failed: {}", e))
    }
}
