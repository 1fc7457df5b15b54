/*!
 * Bounded retry with linear backoff around a generation client.
 *
 * Transient failures (rate limits, exhausted quota, 5xx) are retried after
 * waiting `(attempt + 1) * base_backoff`, with `attempt` counted from zero;
 * anything else is returned immediately.
 */

use log::{error, warn};
use std::time::Duration;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::GenerationClient;

/// Default number of attempts per chunk
pub const DEFAULT_MAX_ATTEMPTS: u32 = 7;

/// Default backoff unit
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(8);

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait after failed attempt `n` (zero-based) is `(n + 1) * base_backoff`
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Backoff after the zero-based attempt `attempt`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff * (attempt + 1)
    }
}

/// What a single attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Generated text of this many chars
    Success { chars: usize },
    /// Retryable failure
    Transient(String),
    /// Non-retryable failure
    Fatal(String),
}

/// Record of one provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationAttempt {
    /// Zero-based attempt number
    pub index: u32,
    /// Size of the user prompt in chars
    pub prompt_chars: usize,
    pub outcome: AttemptOutcome,
    /// Time slept after this attempt (zero when none)
    pub backoff: Duration,
}

/// Calls a generation client under a retry policy
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryingInvoker {
    policy: RetryPolicy,
}

impl RetryingInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate with retries, returning only the result
    pub async fn invoke(
        &self,
        client: &dyn GenerationClient,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, TranslationError> {
        self.invoke_recorded(client, system_instruction, user_prompt).await.0
    }

    /// Generate with retries, also returning a record of every attempt
    pub async fn invoke_recorded(
        &self,
        client: &dyn GenerationClient,
        system_instruction: &str,
        user_prompt: &str,
    ) -> (Result<String, TranslationError>, Vec<TranslationAttempt>) {
        let prompt_chars = user_prompt.chars().count();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = Vec::new();
        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..max_attempts {
            let result = client
                .generate(system_instruction, user_prompt)
                .await
                .and_then(|text| {
                    if text.trim().is_empty() {
                        Err(ProviderError::EmptyResponse)
                    } else {
                        Ok(text)
                    }
                });

            match result {
                Ok(text) => {
                    attempts.push(TranslationAttempt {
                        index: attempt,
                        prompt_chars,
                        outcome: AttemptOutcome::Success { chars: text.chars().count() },
                        backoff: Duration::ZERO,
                    });
                    return (Ok(text), attempts);
                }
                Err(e) if e.is_transient() => {
                    let is_last = attempt + 1 == max_attempts;
                    let backoff = if is_last { Duration::ZERO } else { self.policy.backoff_for(attempt) };

                    attempts.push(TranslationAttempt {
                        index: attempt,
                        prompt_chars,
                        outcome: AttemptOutcome::Transient(e.to_string()),
                        backoff,
                    });

                    if !is_last {
                        warn!(
                            "{} transient failure ({}), waiting {}s (attempt {}/{})",
                            client.name(),
                            e,
                            backoff.as_secs_f32(),
                            attempt + 1,
                            max_attempts
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => {
                    error!("{} fatal error: {}", client.name(), e);
                    attempts.push(TranslationAttempt {
                        index: attempt,
                        prompt_chars,
                        outcome: AttemptOutcome::Fatal(e.to_string()),
                        backoff: Duration::ZERO,
                    });
                    return (Err(TranslationError::Fatal(e)), attempts);
                }
            }
        }

        let last_error = last_error.unwrap_or(ProviderError::EmptyResponse);
        error!("{} gave up after {} attempts: {}", client.name(), max_attempts, last_error);
        (
            Err(TranslationError::RetriesExhausted {
                attempts: max_attempts,
                last_error,
            }),
            attempts,
        )
    }
}
