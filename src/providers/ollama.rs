use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ensure_finished, http_client, non_empty, status_error, transport_error, GenerationClient};

/// Ollama client for a local Ollama server
///
/// Retries are left to the pipeline's retrying invoker, so this client makes
/// exactly one request per call.
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name to use for generation
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generate response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether generation is complete
    #[serde(default)]
    pub done: bool,
    /// `"stop"`, or `"length"` when `num_predict` was reached
    #[serde(default)]
    pub done_reason: Option<String>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions { temperature: Some(temperature) });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a full URL
    pub fn from_url(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout),
            model: model.into(),
            temperature: 0.3,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a completion
    pub async fn generate_completion(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        response.json::<GenerationResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e)))
    }

    /// Text of a finished reply; `done_reason: "length"` means it was cut off
    pub fn reply_text(response: GenerationResponse) -> Result<String, ProviderError> {
        ensure_finished("Ollama", response.done_reason.as_deref(), "length")?;
        non_empty(response.response)
    }
}

#[async_trait]
impl GenerationClient for Ollama {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, user_prompt)
            .system(system_instruction)
            .temperature(self.temperature);
        let response = self.generate_completion(&request).await?;
        Self::reply_text(response)
    }
}
