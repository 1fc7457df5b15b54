use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Extension of the partial artifact, after the chapter stem
const PARTIAL_SUFFIX: &str = "partial.md";

/// Where translated chapters end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Final `<stem>.md` files
    pub output_dir: PathBuf,
    /// In-progress `<stem>.partial.md` files
    pub temp_dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new(output_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn final_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.md", stem))
    }

    pub fn partial_path(&self, stem: &str) -> PathBuf {
        self.temp_dir.join(format!("{}.{}", stem, PARTIAL_SUFFIX))
    }

    /// Create both directories
    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [&self.output_dir, &self.temp_dir] {
            std::fs::create_dir_all(dir).map_err(|source| AppError::PartialWrite {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Status of a chapter as recorded on disk
    pub fn status_of(&self, stem: &str) -> ChapterStatus {
        if FileManager::is_non_empty_file(self.final_path(stem)) {
            ChapterStatus::Complete
        } else if FileManager::file_exists(self.partial_path(stem)) {
            ChapterStatus::InProgress
        } else {
            ChapterStatus::Pending
        }
    }
}

/// Translation state of a chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    /// Nothing written yet
    Pending,
    /// Some chunks translated, no final artifact
    InProgress,
    /// Final artifact exists and is non-empty
    Complete,
}

impl fmt::Display for ChapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        };
        write!(f, "{}", label)
    }
}

/// One chapter file waiting for (or done with) translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterUnit {
    /// Numeric filename prefix, or 1-based position when there is none
    pub ordinal: usize,
    /// Human readable title from the filename
    pub title: String,
    /// Filename without extension; names the artifacts
    pub stem: String,
    /// Source text file
    pub source_path: PathBuf,
    pub status: ChapterStatus,
}

impl ChapterUnit {
    /// Build a unit for `path`, reading its status from `layout`
    pub fn from_path(path: &Path, position: usize, layout: &ArtifactLayout) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (ordinal, title) = parse_stem(&stem, position);
        let status = layout.status_of(&stem);

        Self {
            ordinal,
            title,
            stem,
            source_path: path.to_path_buf(),
            status,
        }
    }

    /// All `*.txt` chapters in `input_dir`, in ascending ordinal order.
    ///
    /// Ties (and files without a numeric prefix) fall back to file-name order.
    pub fn discover(input_dir: &Path, layout: &ArtifactLayout) -> Result<Vec<ChapterUnit>, AppError> {
        if !FileManager::dir_exists(input_dir) {
            return Err(AppError::File(format!("Input directory not found: {}", input_dir.display())));
        }

        let files = FileManager::find_files(input_dir, "txt").map_err(|e| AppError::File(format!("{:#}", e)))?;
        let mut chapters: Vec<ChapterUnit> = files
            .iter()
            .enumerate()
            .map(|(i, path)| ChapterUnit::from_path(path, i + 1, layout))
            .collect();
        chapters.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.stem.cmp(&b.stem)));
        Ok(chapters)
    }

    /// Read the chapter's raw text
    pub fn load_text(&self) -> Result<String, AppError> {
        std::fs::read_to_string(&self.source_path)
            .map_err(|e| AppError::File(format!("Failed to read {}: {}", self.source_path.display(), e)))
    }
}

/// `"07_The_Long_Night"` -> `(7, "The Long Night")`
fn parse_stem(stem: &str, position: usize) -> (usize, String) {
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<usize>() {
        Ok(ordinal) => {
            let rest = stem[digits.len()..].trim_start_matches(['_', '-', ' ']);
            let title = if rest.is_empty() { stem.to_string() } else { rest.replace('_', " ") };
            (ordinal, title)
        }
        Err(_) => (position, stem.replace('_', " ")),
    }
}
