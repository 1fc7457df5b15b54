/*!
 * Tests for the provider factory and the mock client
 */

use std::time::Duration;

use bookwai::app_config::{Config, TranslationProvider};
use bookwai::errors::ProviderError;
use bookwai::providers::mock::{MockClient, MockReply};
use bookwai::providers::ollama::Ollama;
use bookwai::providers::{create_client, GenerationClient};
use bookwai::translation::build_user_prompt;

#[test]
fn test_createClient_withProviderSelection_shouldBuildMatchingClient() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Groq;
    config.translation.active_provider_config_mut().api_key = "gsk-test".to_string();

    let client = create_client(&config.translation).unwrap();

    assert_eq!(client.name(), "Groq");
}

#[tokio::test]
async fn test_mockClient_scripted_shouldPlayRepliesThenWork() {
    let client = MockClient::scripted([MockReply::Transient, MockReply::Text("uno".into())]);
    let prompt = build_user_prompt("", "", "", "one");

    let first = client.generate("sys", &prompt).await;
    let second = client.generate("sys", &prompt).await;
    let third = client.generate("sys", &prompt).await;

    assert!(matches!(first, Err(ref e) if e.is_transient()));
    assert_eq!(second.unwrap(), "uno");
    assert_eq!(third.unwrap(), "[TRANSLATED] one");
    assert_eq!(client.request_count(), 3);
    assert_eq!(client.system_instructions(), vec!["sys"; 3]);
}

#[tokio::test]
async fn test_mockClient_failWhenContains_shouldOnlyFailMatchingChunks() {
    let client = MockClient::fail_when_contains("POISON");

    let ok = client.generate("sys", &build_user_prompt("", "", "", "clean text")).await;
    let bad = client.generate("sys", &build_user_prompt("", "", "", "has POISON in it")).await;

    assert_eq!(ok.unwrap(), "[TRANSLATED] clean text");
    assert!(matches!(bad, Err(ProviderError::ApiError { status_code: 400, .. })));
}

#[test]
fn test_chunkFromPrompt_shouldIgnoreContextSections() {
    let prompt = build_user_prompt("old source", "old target", "(Part 2/3)", "Fresh line.\nSecond line.");
    assert_eq!(MockClient::chunk_from_prompt(&prompt), "Fresh line.\nSecond line.");
}

#[tokio::test]
async fn test_ollama_withUnreachableServer_shouldFailWithoutRetry() {
    let client = Ollama::from_url("http://127.0.0.1:1", "llama3.1", Duration::from_secs(2));

    let err = client.generate("sys", "prompt").await.unwrap_err();

    assert!(matches!(err, ProviderError::ConnectionError(_)));
    assert!(!err.is_transient());
}
