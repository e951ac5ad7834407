use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextGenerator;
use crate::error::GenerationError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Full URL of the generation endpoint.
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `VOCAB_AI_URL` and `VOCAB_AI_TIMEOUT_SECS`.
    ///
    /// Returns `None` when no endpoint is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("VOCAB_AI_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        let timeout = env::var("VOCAB_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            endpoint: endpoint.trim().to_string(),
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Generator that posts `{ "prompt": .. }` to a proxy returning
/// `{ "text": .. }` on success or `{ "error": .. }` on failure.
#[derive(Clone)]
pub struct HttpTextGenerator {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl HttpTextGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeneratorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GeneratorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        debug!(endpoint = %config.endpoint, chars = prompt.len(), "requesting generation");
        let response = self
            .client
            .post(&config.endpoint)
            .timeout(config.timeout)
            .json(&GenerateRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The proxy puts a message in `error`; fall back to the status.
            return match response.json::<GenerateResponse>().await {
                Ok(GenerateResponse {
                    error: Some(message),
                    ..
                }) => Err(GenerationError::Remote(message)),
                _ => Err(GenerationError::HttpStatus(status)),
            };
        }

        let body: GenerateResponse = response.json().await?;
        if let Some(message) = body.error {
            return Err(GenerationError::Remote(message));
        }
        body.text
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
