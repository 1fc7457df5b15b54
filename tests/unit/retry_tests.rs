/*!
 * Tests for retry policy and the retrying invoker
 */

use std::time::Duration;

use bookwai::errors::TranslationError;
use bookwai::providers::mock::{MockClient, MockReply};
use bookwai::translation::{AttemptOutcome, RetryPolicy, RetryingInvoker};

#[test]
fn test_retryPolicy_backoff_shouldGrowLinearly() {
    let policy = RetryPolicy::new(7, Duration::from_secs(8));
    assert_eq!(policy.backoff_for(0), Duration::from_secs(8));
    assert_eq!(policy.backoff_for(1), Duration::from_secs(16));
    assert_eq!(policy.backoff_for(6), Duration::from_secs(56));
}

#[tokio::test]
async fn test_invoker_withTransientThenSuccess_shouldRecordEveryAttempt() {
    let client = MockClient::scripted([MockReply::Transient, MockReply::Transient, MockReply::Text("ok".into())]);
    let invoker = RetryingInvoker::new(RetryPolicy::new(5, Duration::ZERO));

    let (result, attempts) = invoker.invoke_recorded(&client, "system", "prompt").await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.len(), 3);
    assert!(matches!(attempts[0].outcome, AttemptOutcome::Transient(_)));
    assert!(matches!(attempts[2].outcome, AttemptOutcome::Success { chars: 2 }));
    assert_eq!(client.request_count(), 3);
}

#[tokio::test]
async fn test_invoker_withFatalError_shouldNotRetry() {
    let client = MockClient::failing();
    let invoker = RetryingInvoker::new(RetryPolicy::new(5, Duration::ZERO));

    let result = invoker.invoke(&client, "system", "prompt").await;

    assert!(matches!(result, Err(TranslationError::Fatal(_))));
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_invoker_withPersistentRateLimit_shouldExhaustBudget() {
    let client = MockClient::rate_limited();
    let invoker = RetryingInvoker::new(RetryPolicy::new(4, Duration::ZERO));

    let err = invoker.invoke(&client, "system", "prompt").await.unwrap_err();

    assert!(matches!(err, TranslationError::RetriesExhausted { attempts: 4, .. }));
    assert_eq!(err.attempts(), 4);
    assert_eq!(client.request_count(), 4);
}

#[tokio::test]
async fn test_invoker_withEmptyReply_shouldFailFatally() {
    let client = MockClient::empty();
    let invoker = RetryingInvoker::new(RetryPolicy::new(3, Duration::ZERO));

    let result = invoker.invoke(&client, "system", "prompt").await;

    assert!(matches!(result, Err(TranslationError::Fatal(_))));
    assert_eq!(client.request_count(), 1);
}
