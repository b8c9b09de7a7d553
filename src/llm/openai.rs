//! OpenAI API integration.
//!
//! Implements [`LanguageModel`] for OpenAI GPT models and compatible APIs.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{Credential, LanguageModel, LlmError};
use crate::core::{retry_async, LlmConfig, RetryPolicy};

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: Credential,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: Option<u32>,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    /// Create a provider from configuration and a validated key.
    pub fn from_config(config: &LlmConfig, api_key: Credential) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        super::check_model(&config.model);

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: config.retry_policy(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        }
    }

    /// Make a single request to the chat completions endpoint.
    async fn request(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose())
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        let response: ChatResponse = response.json().await?;
        response.into_text()
    }
}

#[async_trait]
impl LanguageModel for OpenAIProvider {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let outcome = retry_async(&self.retry, LlmError::is_transient, || self.request(prompt)).await;
        if outcome.was_retried() {
            tracing::debug!(attempts = outcome.attempts, "Completion needed retries");
        }
        Ok(outcome.into_result()?)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::NoResponse)
    }
}
