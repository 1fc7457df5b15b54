use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Sections shorter than this are table-of-contents entries or running headers
pub const MIN_CHAPTER_WORDS: usize = 100;

/// Output file used when no heading is found
pub const FULL_BOOK_FILE: &str = "full_book.txt";

static CHAPTER_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:Chapter|CHAPTER|अध्याय|Section)\s+(?:\d+|[IVX]+).*").expect("Invalid chapter heading regex")
});

/// A section of the book starting at a heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedChapter {
    /// Heading line, trimmed
    pub heading: String,
    /// Text from the heading up to the next heading
    pub content: String,
    pub word_count: usize,
}

impl DetectedChapter {
    pub fn is_junk(&self) -> bool {
        self.word_count < MIN_CHAPTER_WORDS
    }
}

/// What `split_into_chapter_files` wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    /// Chapter files, in order
    pub written: Vec<PathBuf>,
    /// Headings dropped as junk
    pub skipped_headings: Vec<String>,
}

/// Every heading-delimited section, junk included
pub fn detect_chapters(text: &str) -> Vec<DetectedChapter> {
    let starts: Vec<(usize, &str)> = CHAPTER_HEADING
        .find_iter(text)
        .map(|m| (m.start(), m.as_str()))
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, (start, heading))| {
            let end = starts.get(i + 1).map(|(next, _)| *next).unwrap_or(text.len());
            let content = &text[*start..end];
            DetectedChapter {
                heading: heading.trim().to_string(),
                content: content.to_string(),
                word_count: FileManager::word_count(content),
            }
        })
        .collect()
}

/// `"Chapter 3: The Road"` -> `"Chapter_3_The_Road"`
pub fn safe_file_name(heading: &str) -> String {
    heading
        .trim()
        .replace(' ', "_")
        .replace(':', "")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Write one `NN_<Heading>.txt` file per real chapter into `output_dir`.
///
/// The directory is emptied first. Without any heading the whole text goes to
/// `full_book.txt`.
pub fn split_into_chapter_files(text: &str, output_dir: &Path) -> Result<SplitReport> {
    FileManager::reset_dir(output_dir)?;
    let mut report = SplitReport::default();

    let chapters = detect_chapters(text);
    if chapters.is_empty() {
        warn!("No chapter headings found, saving the whole book as {}", FULL_BOOK_FILE);
        let path = output_dir.join(FULL_BOOK_FILE);
        FileManager::write_to_file(&path, text)?;
        report.written.push(path);
        return Ok(report);
    }

    info!("Found {} potential chapters", chapters.len());
    let (junk, real): (Vec<_>, Vec<_>) = chapters.into_iter().partition(|c| c.is_junk());
    for chapter in junk {
        info!("Skipped header/TOC entry: {} ({} words)", chapter.heading, chapter.word_count);
        report.skipped_headings.push(chapter.heading);
    }

    // Prefixes share one width so file names sort like ordinals
    let width = real.len().to_string().len().max(2);
    for chapter in real {
        let ordinal = report.written.len() + 1;
        let path = output_dir.join(format!(
            "{:0width$}_{}.txt",
            ordinal,
            safe_file_name(&chapter.heading),
            width = width
        ));
        FileManager::write_to_file(&path, &chapter.content)
            .with_context(|| format!("Failed to save chapter '{}'", chapter.heading))?;
        info!("Saved {} ({} words)", path.display(), chapter.word_count);
        report.written.push(path);
    }

    Ok(report)
}
