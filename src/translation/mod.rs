/*!
 * Chunked translation pipeline.
 *
 * Chapters are normalized, split into model-sized chunks and translated one
 * chunk at a time with a rolling context window:
 *
 * - `normalizer`: line-ending and BOM cleanup
 * - `chunker`: paragraph-first, sentence-fallback splitting
 * - `context`: bounded trailing context carried between chunks
 * - `retry`: bounded linear backoff around a generation client
 * - `sanitizer`: strips chatty lead-ins from model output
 * - `prompts`: prompt configuration and prompt builders
 * - `chapter`: chapter discovery and status
 * - `orchestrator`: per-chapter state machine and artifacts
 */

// Re-export main types for easier usage
pub use self::chapter::{ArtifactLayout, ChapterStatus, ChapterUnit};
pub use self::chunker::{chunk_text, split_into_chunks, Chunk};
pub use self::context::ContextWindow;
pub use self::normalizer::normalize;
pub use self::orchestrator::{
    ChapterOrchestrator, ChapterOutcome, ChapterReport, OrchestratorSettings, ProgressEvent, RunSummary,
};
pub use self::prompts::{build_system_instruction, build_user_prompt, PromptConfig};
pub use self::retry::{AttemptOutcome, RetryPolicy, RetryingInvoker, TranslationAttempt};
pub use self::sanitizer::sanitize;

// Submodules
pub mod chapter;
pub mod chunker;
pub mod context;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
pub mod sanitizer;
