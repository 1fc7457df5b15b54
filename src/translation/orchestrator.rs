/*!
 * Chapter orchestrator.
 *
 * Chapters are translated strictly in order, one chunk at a time:
 * 1. A chapter whose final artifact exists and is non-empty is skipped.
 * 2. The text is normalized and chunked; an empty chapter is skipped.
 * 3. Each chunk is translated with the rolling context, sanitized, appended
 *    to the accumulator and flushed to the partial artifact.
 * 4. When every chunk is done the final artifact is written and the partial
 *    artifact removed.
 *
 * The partial artifact is rewritten after every chunk, so an interrupted run
 * loses at most the chunk that was in flight.
 */

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{FailurePolicy, TranslationCommonConfig};
use crate::errors::{AppError, TranslationError};
use crate::file_utils::FileManager;
use crate::providers::GenerationClient;
use crate::translation::chapter::{ArtifactLayout, ChapterStatus, ChapterUnit};
use crate::translation::chunker::split_into_chunks;
use crate::translation::context::ContextWindow;
use crate::translation::normalizer::normalize;
use crate::translation::prompts::build_user_prompt;
use crate::translation::retry::{RetryPolicy, RetryingInvoker};
use crate::translation::sanitizer::sanitize;

/// Knobs for a translation run
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Character budget per chunk
    pub max_chars_per_chunk: usize,
    /// Retry behavior per chunk
    pub retry_policy: RetryPolicy,
    /// Pause after every successful chunk
    pub cooldown: Duration,
    /// What to do when a chunk fails for good
    pub failure_policy: FailurePolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

impl OrchestratorSettings {
    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self {
            max_chars_per_chunk: common.max_chars_per_chunk,
            retry_policy: RetryPolicy::new(common.retry_count, common.retry_backoff()),
            cooldown: common.cooldown(),
            failure_policy: common.failure_policy,
        }
    }

    /// No waiting anywhere; for dry runs and tests
    pub fn without_delays(mut self) -> Self {
        self.retry_policy.base_backoff = Duration::ZERO;
        self.cooldown = Duration::ZERO;
        self
    }
}

/// Progress notifications emitted while a run advances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A chapter has chunks to translate
    ChapterStarted { stem: String, title: String, total_chunks: usize },
    /// A chunk was translated and flushed to the partial artifact
    ChunkTranslated { stem: String, part: usize, total: usize, attempts: usize },
    /// A chunk could not be translated
    ChunkFailed { stem: String, part: usize, total: usize, attempts: usize },
    /// A chapter needed no work
    ChapterSkipped { stem: String },
    /// A chapter reached a terminal state for this run
    ChapterFinished { stem: String, outcome: ChapterOutcome },
}

/// How a chapter ended in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// Final artifact was already present
    AlreadyDone,
    /// No text after normalization
    Empty,
    /// Every chunk translated and finalized
    Completed { chunks: usize },
    /// Finalized with the listed 1-based parts missing
    CompletedWithGaps { chunks: usize, failed_parts: Vec<usize> },
    /// Not finalized; the chapter is retried on the next run
    Aborted { failed_parts: Vec<usize>, translated_chunks: usize, reason: String },
}

impl ChapterOutcome {
    /// Whether the chapter has its final artifact after this run
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::AlreadyDone | Self::Completed { .. } | Self::CompletedWithGaps { .. })
    }
}

/// Result of one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub stem: String,
    pub outcome: ChapterOutcome,
    /// Provider calls spent on this chapter
    pub attempts: usize,
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<ChapterReport>,
}

impl RunSummary {
    fn count(&self, predicate: impl Fn(&ChapterOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::Completed { .. }))
    }

    pub fn completed_with_gaps(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::CompletedWithGaps { .. }))
    }

    pub fn already_done(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::AlreadyDone))
    }

    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::Empty))
    }

    pub fn aborted(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::Aborted { .. }))
    }

    /// Provider calls across the run
    pub fn total_attempts(&self) -> usize {
        self.reports.iter().map(|r| r.attempts).sum()
    }

    /// True when every chapter ended with a gap-free final artifact or was empty
    pub fn is_clean(&self) -> bool {
        self.aborted() == 0 && self.completed_with_gaps() == 0
    }
}

/// Drives chapters through chunking, generation and persistence
#[derive(Debug)]
pub struct ChapterOrchestrator {
    client: Arc<dyn GenerationClient>,
    system_instruction: String,
    settings: OrchestratorSettings,
    layout: ArtifactLayout,
    invoker: RetryingInvoker,
}

impl ChapterOrchestrator {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        system_instruction: impl Into<String>,
        settings: OrchestratorSettings,
        layout: ArtifactLayout,
    ) -> Self {
        let invoker = RetryingInvoker::new(settings.retry_policy);
        Self {
            client,
            system_instruction: system_instruction.into(),
            settings,
            layout,
            invoker,
        }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Number of chunks the unfinished chapters will be split into
    pub fn planned_chunks(&self, chapters: &[ChapterUnit]) -> Result<usize, AppError> {
        let mut total = 0;
        for chapter in chapters {
            if self.layout.status_of(&chapter.stem) == ChapterStatus::Complete {
                continue;
            }
            let text = normalize(&chapter.load_text()?);
            total += split_into_chunks(&text, self.settings.max_chars_per_chunk).len();
        }
        Ok(total)
    }

    /// Translate every chapter in order.
    ///
    /// A chapter that fails under `AbortChapter` does not stop the run; the
    /// next chapter starts with the context left by the last good chunk.
    /// Artifact write failures do stop it.
    pub async fn run<P>(
        &self,
        chapters: &mut [ChapterUnit],
        context: &mut ContextWindow,
        progress: &mut P,
    ) -> Result<RunSummary, AppError>
    where
        P: FnMut(ProgressEvent),
    {
        let mut summary = RunSummary::default();

        for chapter in chapters.iter_mut() {
            let report = self.translate_chapter(chapter, context, progress).await?;
            summary.reports.push(report);
        }

        info!(
            "Run finished: {} completed, {} with gaps, {} aborted, {} already done, {} empty ({} provider calls)",
            summary.completed(),
            summary.completed_with_gaps(),
            summary.aborted(),
            summary.already_done(),
            summary.empty(),
            summary.total_attempts()
        );

        Ok(summary)
    }

    /// Translate one chapter, updating its status and the shared context
    pub async fn translate_chapter<P>(
        &self,
        chapter: &mut ChapterUnit,
        context: &mut ContextWindow,
        progress: &mut P,
    ) -> Result<ChapterReport, AppError>
    where
        P: FnMut(ProgressEvent),
    {
        let stem = chapter.stem.clone();
        let final_path = self.layout.final_path(&stem);
        let partial_path = self.layout.partial_path(&stem);

        if FileManager::is_non_empty_file(&final_path) {
            debug!("Skipping '{}', already translated", stem);
            chapter.status = ChapterStatus::Complete;
            progress(ProgressEvent::ChapterSkipped { stem: stem.clone() });
            return Ok(ChapterReport { stem, outcome: ChapterOutcome::AlreadyDone, attempts: 0 });
        }

        let text = normalize(&chapter.load_text()?);
        let chunks = split_into_chunks(&text, self.settings.max_chars_per_chunk);
        if chunks.is_empty() {
            warn!("Skipping '{}', chapter is empty", stem);
            progress(ProgressEvent::ChapterSkipped { stem: stem.clone() });
            return Ok(ChapterReport { stem, outcome: ChapterOutcome::Empty, attempts: 0 });
        }

        self.layout.ensure_dirs()?;
        let total = chunks.len();
        info!("Translating '{}' ({} chunk{})", chapter.title, total, if total == 1 { "" } else { "s" });
        chapter.status = ChapterStatus::InProgress;
        progress(ProgressEvent::ChapterStarted {
            stem: stem.clone(),
            title: chapter.title.clone(),
            total_chunks: total,
        });

        let mut accumulator = String::new();
        let mut failed_parts = Vec::new();
        let mut chapter_attempts = 0;

        for chunk in &chunks {
            let part = chunk.index + 1;
            let (original_tail, translated_tail) = context.current();
            let prompt = build_user_prompt(original_tail, translated_tail, &chunk.part_label(), &chunk.text);

            let (result, attempts) = self
                .invoker
                .invoke_recorded(self.client.as_ref(), &self.system_instruction, &prompt)
                .await;
            chapter_attempts += attempts.len();

            match result {
                Ok(raw) => {
                    let translated = sanitize(&raw);
                    accumulator.push_str(&translated);
                    accumulator.push_str("\n\n");
                    context.update(&chunk.text, &translated);

                    FileManager::write_atomically(&partial_path, &accumulator)
                        .map_err(|source| AppError::PartialWrite { path: partial_path.clone(), source })?;

                    debug!("'{}' part {}/{} done in {} attempt(s)", stem, part, total, attempts.len());
                    progress(ProgressEvent::ChunkTranslated {
                        stem: stem.clone(),
                        part,
                        total,
                        attempts: attempts.len(),
                    });

                    if !self.settings.cooldown.is_zero() {
                        tokio::time::sleep(self.settings.cooldown).await;
                    }
                }
                Err(e) => {
                    let failure = TranslationError::ChunkFailed {
                        chapter: stem.clone(),
                        part,
                        total,
                        source: Box::new(e),
                    };
                    progress(ProgressEvent::ChunkFailed {
                        stem: stem.clone(),
                        part,
                        total,
                        attempts: attempts.len(),
                    });
                    failed_parts.push(part);

                    match self.settings.failure_policy {
                        FailurePolicy::AbortChapter => {
                            error!("{}; chapter left unfinished", failure);
                            let outcome = ChapterOutcome::Aborted {
                                failed_parts,
                                translated_chunks: chunk.index,
                                reason: failure.to_string(),
                            };
                            progress(ProgressEvent::ChapterFinished { stem: stem.clone(), outcome: outcome.clone() });
                            return Ok(ChapterReport { stem, outcome, attempts: chapter_attempts });
                        }
                        FailurePolicy::SkipChunk => {
                            warn!("{}; leaving a gap", failure);
                        }
                    }
                }
            }
        }

        if failed_parts.len() == total {
            error!("Every chunk of '{}' failed; nothing to finalize", stem);
            let outcome = ChapterOutcome::Aborted {
                failed_parts,
                translated_chunks: 0,
                reason: "all chunks failed".to_string(),
            };
            progress(ProgressEvent::ChapterFinished { stem: stem.clone(), outcome: outcome.clone() });
            return Ok(ChapterReport { stem, outcome, attempts: chapter_attempts });
        }

        FileManager::write_atomically(&final_path, accumulator.trim())
            .map_err(|source| AppError::PartialWrite { path: final_path.clone(), source })?;
        if let Err(e) = FileManager::remove_if_exists(&partial_path) {
            warn!("Could not remove partial artifact {}: {}", partial_path.display(), e);
        }
        chapter.status = ChapterStatus::Complete;

        let outcome = if failed_parts.is_empty() {
            info!("Finished '{}': {}", stem, final_path.display());
            ChapterOutcome::Completed { chunks: total }
        } else {
            warn!("Finished '{}' with missing parts {:?}: {}", stem, failed_parts, final_path.display());
            ChapterOutcome::CompletedWithGaps { chunks: total, failed_parts }
        };
        progress(ProgressEvent::ChapterFinished { stem: stem.clone(), outcome: outcome.clone() });

        Ok(ChapterReport { stem, outcome, attempts: chapter_attempts })
    }
}
