use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

#[cfg(test)]
use mockall::automock;

use crate::config::{GeminiConfig, MISSING_API_KEY};
use crate::error::{Result, SimilarityError};
use crate::models::{GenerateContentRequest, GenerateContentResponse};

/// Client handle for the external model service.
///
/// Constructed once at startup and passed to the invoker, so tests can
/// substitute their own implementation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(cfg: &GeminiConfig, timeout: Duration) -> Result<Self> {
        let api_key = cfg.api_key.trim();
        if api_key.is_empty() {
            return Err(SimilarityError::Config(MISSING_API_KEY.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SimilarityError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    // One attempt per check; failures go straight back to the caller.
    async fn generate_content(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start_time = Instant::now();

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| {
                SimilarityError::Transport(format!("Failed to send request to Gemini API: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                %status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Gemini API returned an error status"
            );
            return Err(SimilarityError::Transport(format!(
                "Gemini API error ({status}): {body}"
            )));
        }

        tracing::debug!(
            model,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Gemini API call succeeded"
        );

        response.json().await.map_err(|e| {
            SimilarityError::Transport(format!("Failed to decode Gemini API response: {e}"))
        })
    }
}
