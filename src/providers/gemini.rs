use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ensure_finished, http_client, non_empty, status_error, transport_error, GenerationClient};

/// Gemini client for the Google Generative Language API
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key passed as the `key` query parameter
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Model name, e.g. `gemini-flash-latest`
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Output cap per request
    max_output_tokens: u32,
}

// Hand-written so the key never lands in debug logs
impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Fixed instruction for the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    /// Conversation turns; a single user turn here
    contents: Vec<GeminiContent>,
    /// Sampling settings
    generation_config: GenerationConfig,
}

/// One content block (a role plus text parts)
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

impl GeminiRequest {
    /// Build a single-turn request
    pub fn new(system_instruction: &str, user_prompt: &str, temperature: f32, max_output_tokens: u32) -> Self {
        let system_instruction = if system_instruction.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system_instruction.to_string() }],
            })
        };

        Self {
            system_instruction,
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: user_prompt.to_string() }],
            }],
            generation_config: GenerationConfig { temperature, max_output_tokens },
        }
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.3,
            max_output_tokens: 8192,
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output cap
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1beta/models/{}:generateContent", base, self.model)
    }

    /// Send a generateContent request
    pub async fn complete(&self, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self.client.post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        if !response.status().is_success() {
            return Err(status_error("Gemini", response).await);
        }

        response.json::<GeminiResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    /// Extract text from the first candidate
    pub fn extract_text_from_response(response: &GeminiResponse) -> String {
        response.candidates.first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect::<String>())
            .unwrap_or_default()
    }

    /// Text of a finished reply; a reply cut at `MAX_TOKENS` is an error
    pub fn reply_text(response: &GeminiResponse) -> Result<String, ProviderError> {
        let reason = response.candidates.first().and_then(|c| c.finish_reason.as_deref());
        if let Some(reason) = reason {
            debug!("Gemini finish reason: {}", reason);
        }
        ensure_finished("Gemini", reason, "MAX_TOKENS")?;
        non_empty(Self::extract_text_from_response(response))
    }
}

#[async_trait]
impl GenerationClient for Gemini {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = GeminiRequest::new(system_instruction, user_prompt, self.temperature, self.max_output_tokens);
        let response = self.complete(&request).await?;
        Self::reply_text(&response)
    }
}
