/*!
 * Provider implementations for different generation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API
 * - OpenAI: OpenAI-compatible chat completions (OpenAI, Groq)
 * - Anthropic: Anthropic Messages API
 * - Ollama: Local LLM server
 * - Mock: Scripted client for tests and dry runs
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{AppError, ProviderError};

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Common trait for all generation backends
///
/// The pipeline only ever hands a client a system instruction and a user
/// prompt and expects the generated text back, so every vendor binding can be
/// swapped for any other (or for a mock in tests).
#[async_trait]
pub trait GenerationClient: Send + Sync + Debug {
    /// Human readable name used in logs
    fn name(&self) -> &str;

    /// Generate text for one chunk
    ///
    /// # Arguments
    /// * `system_instruction` - Fixed instruction for the whole run
    /// * `user_prompt` - Per-chunk prompt including the rolling context
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The generated text or a classified error
    async fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

/// Build the client selected by the translation configuration
pub fn create_client(config: &TranslationConfig) -> Result<Arc<dyn GenerationClient>, AppError> {
    let model = config.get_model();
    let endpoint = config.get_endpoint();
    let api_key = config.get_api_key();
    let timeout = config.get_timeout();
    let temperature = config.common.temperature;
    let max_tokens = config.get_max_output_tokens();

    let client: Arc<dyn GenerationClient> = match config.provider {
        TranslationProvider::Gemini => Arc::new(
            gemini::Gemini::new(api_key, endpoint, model, timeout)
                .with_temperature(temperature)
                .with_max_output_tokens(max_tokens),
        ),
        TranslationProvider::Groq | TranslationProvider::OpenAI => Arc::new(
            openai::OpenAI::new(config.provider.display_name(), api_key, endpoint, model, timeout)
                .with_temperature(temperature)
                .with_max_tokens(max_tokens),
        ),
        TranslationProvider::Anthropic => Arc::new(
            anthropic::Anthropic::new(api_key, endpoint, model, timeout)
                .with_temperature(temperature)
                .with_max_tokens(max_tokens),
        ),
        TranslationProvider::Ollama => Arc::new(
            ollama::Ollama::from_url(endpoint, model, timeout).with_temperature(temperature),
        ),
    };

    Ok(client)
}

/// Shared HTTP client builder for the vendor bindings
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!("Failed to build HTTP client with a {:?} timeout, using defaults: {}", timeout, e);
        Client::new()
    })
}

/// Classify a transport-level reqwest failure
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider, err))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, err))
    }
}

/// Turn a non-success response into a classified error, logging the body
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status.as_u16(), error_text)
}

/// Reject a reply whose stop reason says it hit the output cap
pub(crate) fn ensure_finished(
    provider: &str,
    stop_reason: Option<&str>,
    cap_reason: &str,
) -> Result<(), ProviderError> {
    match stop_reason {
        Some(reason) if reason.eq_ignore_ascii_case(cap_reason) => {
            Err(ProviderError::Truncated(format!("{} stopped with '{}'", provider, reason)))
        }
        _ => Ok(()),
    }
}

/// Reject responses that carry no usable text
pub(crate) fn non_empty(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyResponse)
    } else {
        Ok(text)
    }
}
