use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ensure_finished, http_client, non_empty, status_error, transport_error, GenerationClient};

/// Client for OpenAI-compatible chat completion APIs (OpenAI, Groq)
pub struct OpenAI {
    /// Name used in logs ("OpenAI", "Groq")
    label: String,
    /// HTTP client for API requests
    client: Client,
    /// Bearer token
    api_key: String,
    /// API base URL including the version segment
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Output cap per request
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("label", &self.label)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    /// `"stop"`, or `"length"` when the output cap was hit
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletionRequest {
    /// System turn followed by one user turn
    pub fn new(model: impl Into<String>, system_instruction: &str, user_prompt: &str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system_instruction.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system_instruction.to_string()),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(user_prompt.to_string()),
        });

        Self {
            model: model.into(),
            messages,
            temperature: 0.3,
            max_tokens: 4096,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl OpenAI {
    /// Create a new client for an OpenAI-compatible service
    pub fn new(
        label: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.3,
            max_tokens: 4096,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/chat/completions", base)
    }

    /// Send a chat completion request
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, ProviderError> {
        let response = self.client.post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&self.label, e))?;

        if !response.status().is_success() {
            return Err(status_error(&self.label, response).await);
        }

        response.json::<ChatCompletionResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse {} API response: {}", self.label, e)))
    }

    /// Extract text from the first choice
    pub fn extract_text_from_response(response: &ChatCompletionResponse) -> String {
        response.choices.first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
    }

    /// Text of a finished reply; `length` means it was cut off
    pub fn reply_text(label: &str, response: &ChatCompletionResponse) -> Result<String, ProviderError> {
        let reason = response.choices.first().and_then(|c| c.finish_reason.as_deref());
        ensure_finished(label, reason, "length")?;
        non_empty(Self::extract_text_from_response(response))
    }
}

#[async_trait]
impl GenerationClient for OpenAI {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest::new(&self.model, system_instruction, user_prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        let response = self.complete(&request).await?;
        Self::reply_text(&self.label, &response)
    }
}
