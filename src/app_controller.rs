use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, FailurePolicy};
use crate::extraction::{self, BookMetadata, SplitReport};
use crate::file_utils::FileManager;
use crate::providers::mock::MockClient;
use crate::providers::{self, GenerationClient};
use crate::translation::{
    build_system_instruction, ArtifactLayout, ChapterOrchestrator, ChapterStatus, ChapterUnit, ContextWindow,
    OrchestratorSettings, ProgressEvent, PromptConfig, RunSummary,
};

// @module: Application controller for the extract/translate/report workflow

/// Main application controller for book translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Draw a progress bar while translating
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            show_progress: true,
        })
    }

    /// Turn the progress bar on or off
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(self.config.output_dir(), self.config.temp_dir())
    }

    /// Layout used by dry runs so real artifacts are never touched
    fn dry_run_layout(&self) -> ArtifactLayout {
        let root = self.config.temp_dir().join("dry_run");
        ArtifactLayout::new(root.join("output"), root.join("partial"))
    }

    /// Extract chapters from `pdf` (or the first PDF in the input folder) and
    /// refresh the metadata report.
    pub async fn run_extract(&self, pdf: Option<PathBuf>) -> Result<SplitReport> {
        let start_time = Instant::now();
        let pdf = match pdf {
            Some(path) => path,
            None => self.find_input_pdf()?,
        };
        info!("Extracting chapters from {}", pdf.display());

        // pdf-extract is synchronous and can take a while on large books
        let pdf_path = pdf.clone();
        let text = tokio::task::spawn_blocking(move || extraction::extract_pdf_text(&pdf_path))
            .await
            .context("PDF extraction task failed")??;

        let raw_dir = self.config.raw_text_dir();
        let report = extraction::split_into_chapter_files(&text, &raw_dir)?;
        info!(
            "Extracted {} chapter file(s) into {} ({} junk heading(s) skipped) in {}",
            report.written.len(),
            raw_dir.display(),
            report.skipped_headings.len(),
            Self::format_duration(start_time.elapsed())
        );

        self.run_metadata()?;
        Ok(report)
    }

    /// Write the metadata report for the current chapter files
    pub fn run_metadata(&self) -> Result<BookMetadata> {
        let raw_dir = self.config.raw_text_dir();
        if !FileManager::dir_exists(&raw_dir) {
            return Err(anyhow!("Chapter folder {} does not exist, run extract first", raw_dir.display()));
        }

        let metadata = extraction::generate_metadata(&raw_dir, &self.layout(), &self.config.paths.project_name)?;
        if metadata.total_chapters == 0 {
            warn!("No chapter files in {}, metadata not written", raw_dir.display());
            return Ok(metadata);
        }

        let path = Path::new(&self.config.paths.metadata_path);
        extraction::write_metadata(&metadata, path)?;
        info!(
            "Metadata saved to {}: {} chapters, {} words",
            path.display(),
            metadata.total_chapters,
            metadata.total_words
        );
        Ok(metadata)
    }

    /// Translate every chapter file with the configured provider, or with an
    /// echo client into a scratch folder when `dry_run` is set.
    pub async fn run_translate(&self, dry_run: bool) -> Result<RunSummary> {
        // Prompt config problems must surface before any chapter is touched
        let prompts = PromptConfig::load(&self.config.prompts_path)?;
        let system_instruction = build_system_instruction(&prompts)?;
        let settings = OrchestratorSettings::from_config(&self.config.translation.common);

        if dry_run {
            let layout = self.dry_run_layout();
            FileManager::reset_dir(&layout.output_dir)?;
            FileManager::reset_dir(&layout.temp_dir)?;
            info!("Dry run: echoing chunks into {}", layout.output_dir.display());
            let client: Arc<dyn GenerationClient> = Arc::new(MockClient::echo());
            return self
                .translate_with(client, system_instruction, settings.without_delays(), layout)
                .await;
        }

        self.config.validate()?;
        let client = providers::create_client(&self.config.translation)?;
        info!(
            "BOOKwAI: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        let summary = self.translate_with(client, system_instruction, settings, self.layout()).await?;

        // Keep the report's chapter status in sync with the artifacts
        if let Err(e) = self.run_metadata() {
            warn!("Could not refresh metadata: {}", e);
        }
        Ok(summary)
    }

    /// Translate all chapter files with an explicit client, settings and layout
    pub async fn translate_with(
        &self,
        client: Arc<dyn GenerationClient>,
        system_instruction: String,
        settings: OrchestratorSettings,
        layout: ArtifactLayout,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut chapters = ChapterUnit::discover(&self.config.raw_text_dir(), &layout)?;
        if chapters.is_empty() {
            warn!("No chapter files found in {}", self.config.raw_text_dir().display());
            return Ok(RunSummary::default());
        }

        let failure_policy = settings.failure_policy;
        let orchestrator = ChapterOrchestrator::new(client, system_instruction, settings, layout);
        let planned = orchestrator.planned_chunks(&chapters)?;
        let pending = chapters.len() - chapters.iter().filter(|c| c.status == ChapterStatus::Complete).count();
        info!("{} of {} chapter(s) to translate, {} chunk(s)", pending, chapters.len(), planned);

        let progress_bar = self.progress_bar(planned as u64);
        let pb = progress_bar.clone();
        let mut on_progress = move |event: ProgressEvent| match event {
            ProgressEvent::ChapterStarted { title, .. } => pb.set_message(title),
            ProgressEvent::ChunkTranslated { .. } => pb.inc(1),
            ProgressEvent::ChunkFailed { part, total, .. } => {
                // An aborted chapter never reaches its remaining chunks
                let advanced = match failure_policy {
                    FailurePolicy::AbortChapter => total - part + 1,
                    FailurePolicy::SkipChunk => 1,
                };
                pb.inc(advanced as u64);
            }
            ProgressEvent::ChapterSkipped { .. } | ProgressEvent::ChapterFinished { .. } => {}
        };

        let mut context = ContextWindow::new(self.config.translation.common.context_window_chars);
        let result = orchestrator.run(&mut chapters, &mut context, &mut on_progress).await;
        progress_bar.finish_and_clear();
        let summary = result?;

        info!(
            "Translation finished in {}: {} completed, {} with gaps, {} unfinished, {} skipped",
            Self::format_duration(start_time.elapsed()),
            summary.completed(),
            summary.completed_with_gaps(),
            summary.aborted(),
            summary.already_done() + summary.empty()
        );
        if summary.aborted() > 0 {
            warn!("Unfinished chapters are picked up again on the next run");
        }
        info!("Output: {}", orchestrator.layout().output_dir.display());

        Ok(summary)
    }

    /// Extract, then translate
    pub async fn run_all(&self, pdf: Option<PathBuf>) -> Result<RunSummary> {
        self.run_extract(pdf).await?;
        self.run_translate(false).await
    }

    fn find_input_pdf(&self) -> Result<PathBuf> {
        let input_dir = Path::new(&self.config.paths.pdf_input_dir);
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("PDF folder {} does not exist", input_dir.display()));
        }
        let pdfs = FileManager::find_files(input_dir, "pdf")?;
        match pdfs.len() {
            0 => Err(anyhow!("No PDF found in {}", input_dir.display())),
            1 => Ok(pdfs[0].clone()),
            n => {
                warn!("{} PDFs found in {}, using {}", n, input_dir.display(), pdfs[0].display());
                Ok(pdfs[0].clone())
            }
        }
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
