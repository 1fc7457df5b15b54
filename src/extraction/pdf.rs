use anyhow::{anyhow, Context, Result};
use log::debug;
use std::path::Path;

/// Page numbers are short runs of digits on a line of their own
const MAX_PAGE_NUMBER_LEN: usize = 3;

/// Extract the text layer of a PDF and drop page-number lines.
pub fn extract_pdf_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    let text = pdf_extract::extract_text_from_mem(&data)
        .map_err(|e| anyhow!("Failed to extract text from {}: {}", path.display(), e))?;
    if text.trim().is_empty() {
        return Err(anyhow!("No text layer found in {} (scanned PDF?)", path.display()));
    }

    debug!("Extracted {} chars from {}", text.len(), path.display());
    Ok(strip_page_numbers(&text))
}

/// Remove lines that hold nothing but a page number.
///
/// Form feeds between pages become line breaks.
pub fn strip_page_numbers(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for line in text.split(['\n', '\x0C']) {
        let trimmed = line.trim();
        let is_page_number = !trimmed.is_empty()
            && trimmed.len() <= MAX_PAGE_NUMBER_LEN
            && trimmed.chars().all(|c| c.is_ascii_digit());
        if is_page_number {
            continue;
        }
        cleaned.push_str(line);
        cleaned.push('\n');
    }
    cleaned
}
