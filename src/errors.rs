/*!
 * Error types for the bookwai application.
 *
 * Provider failures are classified as transient (worth waiting for) or fatal,
 * translation failures describe what happened to a single chunk, and
 * `AppError` covers everything that stops a run.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The account or key ran out of quota
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The provider is overloaded or temporarily down
    #[error("Server unavailable: {status_code} - {message}")]
    ServerUnavailable {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider answered but produced no text
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Generation stopped at the output-token cap, so the text is incomplete
    #[error("Response cut off by the output token limit: {0}")]
    Truncated(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and its body to a classified error.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            429 => {
                let lower = message.to_lowercase();
                if lower.contains("quota") || lower.contains("exhausted") {
                    Self::QuotaExhausted(message)
                } else {
                    Self::RateLimitExceeded(message)
                }
            }
            401 | 403 => Self::AuthenticationError(message),
            500..=599 => Self::ServerUnavailable { status_code, message },
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether waiting and retrying can reasonably fix this failure.
    ///
    /// Rate limits, exhausted quotas and 5xx answers are transient; bad
    /// requests, auth failures, unexpected payloads, truncated replies and
    /// transport errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) | Self::QuotaExhausted(_) | Self::ServerUnavailable { .. } => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors that can occur while translating a chunk
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The provider failed in a way retrying cannot fix
    #[error("Fatal provider error: {0}")]
    Fatal(#[source] ProviderError),

    /// Every attempt hit a transient failure
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        last_error: ProviderError,
    },

    /// A chunk of a chapter could not be translated
    #[error("Chunk {part}/{total} of '{chapter}' failed: {source}")]
    ChunkFailed {
        /// Chapter stem
        chapter: String,
        /// 1-based chunk position
        part: usize,
        /// Number of chunks in the chapter
        total: usize,
        /// Underlying invocation failure
        #[source]
        source: Box<TranslationError>,
    },
}

impl TranslationError {
    /// Number of provider calls that were spent before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal(_) => 1,
            Self::RetriesExhausted { attempts, .. } => *attempts,
            Self::ChunkFailed { source, .. } => source.attempts(),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Required configuration file or key is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An artifact could not be written; the run stops rather than lose output
    #[error("Failed to write '{path}': {source}")]
    PartialWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error while extracting chapters from the source document
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
