//! Reasoning collaborator: single-turn chat completion with a max-token
//! budget and a per-call timeout. The orchestrator receives the client by
//! injection and shares it across requests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Send one chat-completion request and return the response text.
    /// Exceeding `timeout` is a terminal failure for the call; callers apply
    /// their own degrade policy and never retry.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<String>;
}

/// Build the configured provider client. The `reqwest::Client` is shared with
/// the rest of the application.
pub fn build_client(http: reqwest::Client, config: &LlmConfig) -> Result<Arc<dyn ReasoningClient>> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicClient {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })),
        "openai" => Ok(Arc::new(OpenAiClient {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })),
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    }
}

// ─── Anthropic Messages API ──────────────────────────────

pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}

#[async_trait]
impl ReasoningClient for AnthropicClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<String> {
        let req = AnthropicRequest {
            model: &self.model,
            max_tokens,
            messages,
        };

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("anthropic-version", "2023-06-01")
            .timeout(timeout)
            .json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let resp = builder
            .send()
            .await
            .context("Failed to call Anthropic messages API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API returned {status}: {body}");
        }

        let body: AnthropicResponse = resp
            .json()
            .await
            .context("Failed to parse Anthropic response")?;
        body.content
            .into_iter()
            .next()
            .map(|c| c.text)
            .context("Anthropic response carried no content block")
    }
}

// ─── OpenAI-compatible ───────────────────────────────────

pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[async_trait]
impl ReasoningClient for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<String> {
        let req = OpenAiRequest {
            model: &self.model,
            max_tokens,
            messages,
        };

        let api_key = self.api_key.as_deref().unwrap_or_default();
        let resp = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .timeout(timeout)
            .json(&req)
            .send()
            .await
            .context("Failed to call OpenAI chat API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI chat API returned {status}: {body}");
        }

        let body: OpenAiResponse = resp
            .json()
            .await
            .context("Failed to parse OpenAI response")?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("OpenAI response carried no choices")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = LlmConfig {
            provider: "bedrock".to_string(),
            ..LlmConfig::default()
        };
        assert!(build_client(reqwest::Client::new(), &config).is_err());
    }

    #[test]
    fn test_known_providers_build() {
        for provider in ["anthropic", "openai"] {
            let config = LlmConfig {
                provider: provider.to_string(),
                ..LlmConfig::default()
            };
            assert!(build_client(reqwest::Client::new(), &config).is_ok());
        }
    }
}
