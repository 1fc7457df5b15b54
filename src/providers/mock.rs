/*!
 * Mock generation client for tests and dry runs.
 *
 * - `MockClient::echo()` - returns the chunk text unchanged (used by `--dry-run`)
 * - `MockClient::working()` - returns `[TRANSLATED] <chunk>`
 * - `MockClient::failing()` - always fails with a fatal error
 * - `MockClient::rate_limited()` - always fails with a transient error
 * - `MockClient::scripted(..)` - plays back a fixed list of replies
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::GenerationClient;
use crate::translation::prompts::{END_MARKER, TRANSLATE_LEAD};

/// Behavior mode for the mock client
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Return the chunk text as is
    Echo,
    /// Return the chunk text with a `[TRANSLATED] ` prefix
    Working,
    /// Always fail with a non-retryable error
    Failing,
    /// Always fail with a rate limit
    RateLimited,
    /// Always return whitespace
    Empty,
    /// Fail fatally when the chunk contains the marker, otherwise work
    FailWhenContains(String),
}

/// One scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Successful generation with this text
    Text(String),
    /// A 429 rate limit
    Transient,
    /// A 400 bad request
    Fatal,
    /// An empty body
    Empty,
    /// Text that stopped at the output-token cap
    Truncated,
}

/// Mock client for exercising the translation pipeline
#[derive(Debug, Clone)]
pub struct MockClient {
    /// Behavior once the script is used up
    behavior: MockBehavior,
    /// Replies played back before falling back to `behavior`
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Number of generate calls
    request_count: Arc<AtomicUsize>,
    /// Every user prompt received, in order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Every system instruction received, in order
    system_instructions: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    /// Create a new mock client with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            system_instructions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Fail on any chunk containing `marker`
    pub fn fail_when_contains(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailWhenContains(marker.into()))
    }

    /// Play back `replies` in order, then behave like `working()`
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let client = Self::working();
        client.script.lock().extend(replies);
        client
    }

    /// Number of generate calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// User prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// System instructions received so far
    pub fn system_instructions(&self) -> Vec<String> {
        self.system_instructions.lock().clone()
    }

    /// Pull the chunk body out of a user prompt
    pub fn chunk_from_prompt(prompt: &str) -> &str {
        let body = match prompt.find(TRANSLATE_LEAD) {
            Some(start) => {
                let rest = &prompt[start..];
                rest.find("\n\n").map(|i| &rest[i + 2..]).unwrap_or(rest)
            }
            None => prompt,
        };
        body.rsplit_once(END_MARKER).map(|(chunk, _)| chunk).unwrap_or(body).trim()
    }

    fn reply(reply: MockReply, chunk: &str) -> Result<String, ProviderError> {
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Transient => Err(ProviderError::from_status(429, "Too many requests")),
            MockReply::Fatal => Err(ProviderError::from_status(400, format!("Rejected chunk: {}", chunk.len()))),
            MockReply::Empty => Err(ProviderError::EmptyResponse),
            MockReply::Truncated => Err(ProviderError::Truncated("Mock stopped with 'length'".to_string())),
        }
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(user_prompt.to_string());
        self.system_instructions.lock().push(system_instruction.to_string());

        let chunk = Self::chunk_from_prompt(user_prompt);

        let scripted = self.script.lock().pop_front();
        if let Some(reply) = scripted {
            return Self::reply(reply, chunk);
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(chunk.to_string()),
            MockBehavior::Working => Ok(format!("[TRANSLATED] {}", chunk)),
            MockBehavior::Failing => Self::reply(MockReply::Fatal, chunk),
            MockBehavior::RateLimited => Self::reply(MockReply::Transient, chunk),
            MockBehavior::Empty => Self::reply(MockReply::Empty, chunk),
            MockBehavior::FailWhenContains(marker) => {
                if chunk.contains(marker.as_str()) {
                    Self::reply(MockReply::Fatal, chunk)
                } else {
                    Ok(format!("[TRANSLATED] {}", chunk))
                }
            }
        }
    }
}
