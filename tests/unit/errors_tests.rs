/*!
 * Tests for error classification and conversion
 */

use std::error::Error;

use bookwai::errors::{AppError, ProviderError, TranslationError};

#[test]
fn test_fromStatus_withRetryableStatuses_shouldBeTransient() {
    for status in [429, 500, 502, 503, 504] {
        assert!(ProviderError::from_status(status, "busy").is_transient(), "status {}", status);
    }
}

#[test]
fn test_fromStatus_withClientErrors_shouldBeFatal() {
    assert!(matches!(ProviderError::from_status(401, "bad key"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "denied"), ProviderError::AuthenticationError(_)));
    for status in [400, 401, 403, 404, 422] {
        assert!(!ProviderError::from_status(status, "nope").is_transient(), "status {}", status);
    }
}

#[test]
fn test_isTransient_withTransportAndParseErrors_shouldBeFatal() {
    assert!(!ProviderError::ConnectionError("refused".into()).is_transient());
    assert!(!ProviderError::ParseError("bad json".into()).is_transient());
    assert!(!ProviderError::EmptyResponse.is_transient());
}

#[test]
fn test_chunkFailed_shouldReportChapterAndNestedAttempts() {
    let err = TranslationError::ChunkFailed {
        chapter: "03_Storm".to_string(),
        part: 2,
        total: 5,
        source: Box::new(TranslationError::RetriesExhausted {
            attempts: 7,
            last_error: ProviderError::from_status(429, "slow down"),
        }),
    };

    assert_eq!(err.attempts(), 7);
    let message = err.to_string();
    assert!(message.contains("2/5"));
    assert!(message.contains("03_Storm"));
    assert!(err.source().is_some());
}

#[test]
fn test_appError_fromProviderError_shouldWrapIt() {
    let app_err: AppError = ProviderError::EmptyResponse.into();
    assert!(matches!(app_err, AppError::Provider(ProviderError::EmptyResponse)));
}

#[test]
fn test_appError_partialWrite_shouldNamePath() {
    let err = AppError::PartialWrite {
        path: "data/temp/01_A.partial.md".into(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
    };
    assert!(err.to_string().contains("01_A.partial.md"));
    assert!(err.source().is_some());
}

#[test]
fn test_appError_throughAnyhow_shouldDowncast() {
    let err: anyhow::Error = AppError::Configuration("prompts.json missing".into()).into();
    let app_err = err.downcast_ref::<AppError>().unwrap();
    assert!(matches!(app_err, AppError::Configuration(_)));
}
