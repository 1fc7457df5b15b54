/*!
 * # BOOKwAI - Book translation with AI
 *
 * A Rust library for translating whole books with large language models.
 *
 * ## Features
 *
 * - Extract chapter text from PDF books (page numbers and TOC junk removed)
 * - Split chapters into model-sized chunks on paragraph and sentence boundaries
 * - Carry a rolling context window from one chunk to the next
 * - Translate with various providers:
 *   - Gemini
 *   - Groq and OpenAI (chat completions)
 *   - Anthropic
 *   - Ollama (local LLM)
 * - Retry rate limits and server errors with linear backoff
 * - Resume interrupted runs without redoing finished chapters
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The chunked translation pipeline:
 *   - `translation::chunker`: Paragraph-first chunking
 *   - `translation::context`: Rolling context window
 *   - `translation::retry`: Retrying invoker
 *   - `translation::orchestrator`: Per-chapter state machine
 * - `extraction`: PDF text, chapter files and metadata report
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{display_language, get_language_name, normalize_to_part2t};
pub use providers::GenerationClient;
pub use translation::{ChapterOrchestrator, ContextWindow, PromptConfig};
