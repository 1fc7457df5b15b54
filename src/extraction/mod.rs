/*!
 * Source document extraction.
 *
 * - `pdf`: text layer extraction and page-number cleanup
 * - `chapters`: heading-based chapter detection and chapter files
 * - `metadata`: JSON report about the extracted chapters
 */

pub use self::chapters::{detect_chapters, split_into_chapter_files, DetectedChapter, SplitReport};
pub use self::metadata::{generate_metadata, write_metadata, BookMetadata, ChapterMetadata};
pub use self::pdf::{extract_pdf_text, strip_page_numbers};

pub mod chapters;
pub mod metadata;
pub mod pdf;
