use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use super::types::{ApiErrorBody, CompletionRequest, CompletionResponse};
use super::CompletionBackend;
use crate::config::{LlmConfig, RequestConfig, SamplingConfig};
use crate::error::{TransportError, TransportResult};

/// HTTP implementation of the completion capability.
///
/// Single-shot: one request per call, no retry, no streaming. The transport
/// timeout configured here is the only time bound on a workflow.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_ms: u64,
}

impl CompletionClient {
    /// Create a new completion client.
    pub fn new(
        api_key: impl Into<String>,
        config: &LlmConfig,
        request_config: &RequestConfig,
    ) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            timeout_ms: request_config.timeout_ms,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        sampling: &SamplingConfig,
    ) -> TransportResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = CompletionRequest::new(&self.model, system_prompt, user_prompt)
            .with_max_tokens(sampling.max_tokens)
            .with_temperature(sampling.temperature);

        debug!(
            model = %self.model,
            max_tokens = sampling.max_tokens,
            temperature = sampling.temperature,
            "Calling completion backend"
        );

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    TransportError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Prefer the provider's own message when the body carries one.
            let message = serde_json::from_str::<ApiErrorBody>(&error_body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    if error_body.is_empty() {
                        format!("request failed with status {}", status.as_u16())
                    } else {
                        error_body
                    }
                });
            error!(status = status.as_u16(), error = %message, "Completion call rejected");
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse =
            response
                .json()
                .await
                .map_err(|e| TransportError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TransportError::InvalidResponse {
                message: "response contained no choices".to_string(),
            })?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Completion call succeeded"
        );

        Ok(text)
    }
}
