// ABOUTME: OpenAI-compatible chat completions client built on reqwest
// ABOUTME: Applies the configured timeout and maps every failure to None
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::LlmClient;
use crate::config::environment::LlmConfig;
use crate::errors::{AppError, AppResult};

/// Connection timeout, separate from the whole-request timeout
const CONNECT_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for any endpoint implementing the `OpenAI` chat completions API
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleClient {
    /// Build a client from configuration; `None` when no API key is set
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &LlmConfig) -> AppResult<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: config.model.clone(),
        }))
    }

    async fn request(&self, prompt: &str, max_tokens: u32) -> AppResult<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AppError::external_unavailable("LLM", e.to_string())
                } else {
                    AppError::external_service("LLM", format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(
                "LLM",
                format!("Endpoint returned {status}"),
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service("LLM", format!("Bad response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::external_service("LLM", "Empty completion"))
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Option<String> {
        match self.request(prompt, max_tokens).await {
            Ok(content) => {
                debug!(chars = content.len(), "LLM completion received");
                Some(content)
            }
            Err(e) => {
                warn!(error = %e, "LLM completion failed, using fallback");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_client_without_api_key() {
        let config = LlmConfig::default();
        assert!(matches!(OpenAiCompatibleClient::from_config(&config), Ok(None)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = LlmConfig {
            api_key: Some("key".to_owned()),
            base_url: "http://localhost:11434/v1/".to_owned(),
            ..LlmConfig::default()
        };
        let client = OpenAiCompatibleClient::from_config(&config).ok().flatten();
        assert_eq!(
            client.map(|c| c.base_url),
            Some("http://localhost:11434/v1".to_owned())
        );
    }
}
