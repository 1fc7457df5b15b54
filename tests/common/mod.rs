/*!
 * Common test utilities for the bookwai test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use bookwai::app_config::{Config, FailurePolicy};
use bookwai::providers::mock::MockClient;
use bookwai::translation::{
    ArtifactLayout, ChapterOrchestrator, ChapterUnit, OrchestratorSettings, PromptConfig, RetryPolicy,
};

/// Route library logs through env_logger; repeated calls are fine
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A working project rooted in a temp dir: config, prompts and folders
pub struct TestProject {
    pub dir: TempDir,
    pub config: Config,
}

impl TestProject {
    /// Project with a valid `prompts.json` and no chapters yet
    pub fn new() -> Result<Self> {
        init_logging();
        let dir = create_temp_dir()?;
        let root = dir.path();

        let mut config = Config::default();
        config.prompts_path = path_string(&root.join("config").join("prompts.json"));
        config.paths.pdf_input_dir = path_string(&root.join("data").join("input_pdfs"));
        config.paths.raw_text_dir = path_string(&root.join("data").join("raw_text"));
        config.paths.output_dir = path_string(&root.join("data").join("output_books"));
        config.paths.temp_dir = path_string(&root.join("data").join("temp"));
        config.paths.metadata_path = path_string(&root.join("data").join("metadata.json"));
        config.paths.project_name = "Test Book".to_string();

        let prompts = serde_json::to_string_pretty(&PromptConfig::sample())?;
        create_test_file(&root.join("config"), "prompts.json", &prompts)?;
        fs::create_dir_all(config.raw_text_dir())?;

        Ok(Self { dir, config })
    }

    /// Write a chapter file into the raw text folder
    pub fn add_chapter(&self, filename: &str, content: &str) -> Result<PathBuf> {
        create_test_file(&self.config.raw_text_dir(), filename, content)
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(self.config.output_dir(), self.config.temp_dir())
    }

    pub fn chapters(&self) -> Vec<ChapterUnit> {
        ChapterUnit::discover(&self.config.raw_text_dir(), &self.layout()).expect("chapter discovery")
    }

    pub fn read_final(&self, stem: &str) -> Option<String> {
        fs::read_to_string(self.layout().final_path(stem)).ok()
    }

    pub fn read_partial(&self, stem: &str) -> Option<String> {
        fs::read_to_string(self.layout().partial_path(stem)).ok()
    }
}

/// Settings with no sleeping and a small retry budget
pub fn fast_settings(max_chars: usize, max_attempts: u32, failure_policy: FailurePolicy) -> OrchestratorSettings {
    OrchestratorSettings {
        max_chars_per_chunk: max_chars,
        retry_policy: RetryPolicy::new(max_attempts, Duration::ZERO),
        cooldown: Duration::ZERO,
        failure_policy,
    }
}

/// Orchestrator over a mock client that the test keeps a handle to
pub fn orchestrator_for(client: &MockClient, layout: ArtifactLayout, settings: OrchestratorSettings) -> ChapterOrchestrator {
    ChapterOrchestrator::new(Arc::new(client.clone()), "You translate books.", settings, layout)
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
