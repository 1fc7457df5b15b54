use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::file_utils::FileManager;
use crate::translation::chapter::{ArtifactLayout, ChapterStatus};

/// Report written to `metadata.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookMetadata {
    pub project_name: String,
    pub total_chapters: usize,
    pub total_words: usize,
    pub average_words_per_chapter: usize,
    pub chapters: Vec<ChapterMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterMetadata {
    pub filename: String,
    pub word_count: usize,
    pub status: ChapterStatus,
}

/// Count words of every chapter file and read each chapter's status from the
/// artifact layout.
pub fn generate_metadata(raw_text_dir: &Path, layout: &ArtifactLayout, project_name: &str) -> Result<BookMetadata> {
    let files = FileManager::find_files(raw_text_dir, "txt")?;

    let mut chapters = Vec::with_capacity(files.len());
    for file in &files {
        let text = FileManager::read_to_string(file)?;
        let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        chapters.push(ChapterMetadata {
            filename: file.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
            word_count: FileManager::word_count(&text),
            status: layout.status_of(&stem),
        });
    }

    let total_words: usize = chapters.iter().map(|c| c.word_count).sum();
    let average_words_per_chapter = total_words.checked_div(chapters.len()).unwrap_or(0);

    Ok(BookMetadata {
        project_name: project_name.to_string(),
        total_chapters: chapters.len(),
        total_words,
        average_words_per_chapter,
        chapters,
    })
}

/// Write the report as pretty JSON
pub fn write_metadata(metadata: &BookMetadata, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    FileManager::write_to_file(path, &json)
}
