use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path to the prompt configuration (languages, instructions, style rules)
    #[serde(default = "default_prompts_path")]
    pub prompts_path: String,

    /// Working directories and report locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Where the pipeline reads and writes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    /// Folder scanned for source PDFs
    #[serde(default = "default_pdf_input_dir")]
    pub pdf_input_dir: String,

    /// One text file per extracted chapter
    #[serde(default = "default_raw_text_dir")]
    pub raw_text_dir: String,

    /// Final translated chapters
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Partial in-progress chapters
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// JSON report about the extracted chapters
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,

    /// Name recorded in the metadata report
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pdf_input_dir: default_pdf_input_dir(),
            raw_text_dir: default_raw_text_dir(),
            output_dir: default_output_dir(),
            temp_dir: default_temp_dir(),
            metadata_path: default_metadata_path(),
            project_name: default_project_name(),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Groq (OpenAI-compatible)
    Groq,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Groq => "Groq",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Groq => "groq".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    // @returns: Environment variable consulted when no key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }

    pub fn all() -> [TranslationProvider; 5] {
        [Self::Gemini, Self::Groq, Self::OpenAI, Self::Anthropic, Self::Ollama]
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key (falls back to the provider's environment variable)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max tokens the model may produce per chunk
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// What to do when a chunk cannot be translated
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the chapter; it stays unfinished and is retried on the next run
    #[default]
    AbortChapter,
    /// Leave a gap, keep going, and report the gap when finalizing
    SkipChunk,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Character budget for a single chunk
    #[serde(default = "default_max_chars_per_chunk")]
    pub max_chars_per_chunk: usize,

    /// Characters of original and translated text carried to the next chunk
    #[serde(default = "default_context_window_chars")]
    pub context_window_chars: usize,

    /// Attempts per chunk before giving up on transient failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff unit in milliseconds; attempt n waits n * this
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Pause after every successful chunk, in milliseconds
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Behavior when a chunk fails for good
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl TranslationCommonConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_chars_per_chunk: default_max_chars_per_chunk(),
            context_window_chars: default_context_window_chars(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cooldown_ms: default_cooldown_ms(),
            temperature: default_temperature(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_prompts_path() -> String {
    "config/prompts.json".to_string()
}

fn default_pdf_input_dir() -> String {
    "data/input_pdfs".to_string()
}

fn default_raw_text_dir() -> String {
    "data/raw_text".to_string()
}

fn default_output_dir() -> String {
    "data/output_books".to_string()
}

fn default_temp_dir() -> String {
    "data/temp".to_string()
}

fn default_metadata_path() -> String {
    "data/metadata.json".to_string()
}

fn default_project_name() -> String {
    "My AI Book".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_max_chars_per_chunk() -> usize {
    7000
}

fn default_context_window_chars() -> usize {
    1500
}

fn default_retry_count() -> u32 {
    7
}

fn default_retry_backoff_ms() -> u64 {
    8000 // 8s, 16s, 24s, ...
}

fn default_cooldown_ms() -> u64 {
    4000 // free tiers allow roughly 15 requests per minute
}

fn default_temperature() -> f32 {
    0.3
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "gemini-flash-latest",
        TranslationProvider::Groq => "llama-3.3-70b-versatile",
        TranslationProvider::OpenAI => "gpt-4o-mini",
        TranslationProvider::Anthropic => "claude-3-5-haiku-latest",
        TranslationProvider::Ollama => "llama3.1",
    }
    .to_string()
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "https://generativelanguage.googleapis.com",
        TranslationProvider::Groq => "https://api.groq.com/openai/v1",
        TranslationProvider::OpenAI => "https://api.openai.com/v1",
        TranslationProvider::Anthropic => "https://api.anthropic.com",
        TranslationProvider::Ollama => "http://localhost:11434",
    }
    .to_string()
}

impl Config {
    /// Load the configuration from `path`, writing a default one first if the
    /// file does not exist yet.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        let common = &self.translation.common;
        if common.max_chars_per_chunk == 0 {
            return Err(AppError::Configuration("max_chars_per_chunk must be greater than 0".to_string()));
        }
        if common.context_window_chars == 0 {
            return Err(AppError::Configuration("context_window_chars must be greater than 0".to_string()));
        }
        if common.retry_count == 0 {
            return Err(AppError::Configuration("retry_count must be at least 1".to_string()));
        }
        if !(0.0..=2.0).contains(&common.temperature) {
            return Err(AppError::Configuration(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                common.temperature
            )));
        }

        let endpoint = self.translation.get_endpoint();
        url::Url::parse(&endpoint)
            .map_err(|e| AppError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        // Every hosted provider needs a key
        if let Some(env_var) = self.translation.provider.api_key_env_var() {
            if self.translation.get_api_key().is_empty() {
                return Err(AppError::Configuration(format!(
                    "API key is required for {} (set it in the config or {})",
                    self.translation.provider.display_name(),
                    env_var
                )));
            }
        }

        Ok(())
    }

    pub fn raw_text_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.raw_text_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.output_dir)
    }

    pub fn temp_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.temp_dir)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            prompts_path: default_prompts_path(),
            paths: PathsConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider entry, inserting defaults if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(index) = self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            return &mut self.available_providers[index];
        }
        self.available_providers.push(ProviderConfig::new(self.provider.clone()));
        let last = self.available_providers.len() - 1;
        &mut self.available_providers[last]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the API key for the active provider, falling back to its
    /// environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(key) = self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .filter(|k| !k.is_empty())
        {
            return key;
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .map(|k| k.trim().to_string())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout(&self) -> Duration {
        let secs = self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|s| *s > 0)
            .unwrap_or_else(default_timeout_secs);
        Duration::from_secs(secs)
    }

    /// Get the output token cap for the active provider
    pub fn get_max_output_tokens(&self) -> u32 {
        self.get_active_provider_config()
            .map(|p| p.max_output_tokens)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_max_output_tokens)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: TranslationProvider::all()
                .into_iter()
                .map(ProviderConfig::new)
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
