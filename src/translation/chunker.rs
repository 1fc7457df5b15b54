/*!
 * Smart chunker.
 *
 * Chapter text is cut into pieces that fit a character budget. Paragraph
 * boundaries are preferred; a paragraph that is too long on its own is cut at
 * sentence boundaries (`". "`). Pieces are packed greedily, so a chunk holds as
 * many whole paragraphs as fit. Lengths are counted in `char`s so Devanagari
 * and other multi-byte scripts get the same budget as ASCII.
 */

use crate::translation::normalizer::normalize;

/// One model-sized slice of a chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the chapter
    pub index: usize,
    /// Number of chunks in the chapter
    pub total: usize,
    /// Chunk text, trimmed
    pub text: String,
}

impl Chunk {
    /// `"(Part i/N)"` for split chapters, empty otherwise
    pub fn part_label(&self) -> String {
        if self.total > 1 {
            format!("(Part {}/{})", self.index + 1, self.total)
        } else {
            String::new()
        }
    }

    /// Length in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into chunks of at most `max_chars` characters where possible.
///
/// Returns no chunks for blank text. A single sentence longer than the budget
/// is kept whole as one oversized chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = normalize(text);
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for paragraph in text.lines().map(str::trim).filter(|p| !p.is_empty()) {
        for piece in paragraph_pieces(paragraph, max_chars) {
            let piece_len = piece.chars().count();
            let content_len = piece.trim_end().chars().count();

            if buffer_len > 0 && buffer_len + content_len > max_chars {
                flush(&mut buffer, &mut chunks);
                buffer_len = 0;
            }

            buffer.push_str(&piece);
            buffer_len += piece_len;
        }
    }
    flush(&mut buffer, &mut chunks);

    chunks
}

/// Like [`chunk_text`] but with positions attached
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<Chunk> {
    let texts = chunk_text(text, max_chars);
    let total = texts.len();
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, total, text })
        .collect()
}

/// A paragraph as packable pieces, each carrying its trailing separator
fn paragraph_pieces(paragraph: &str, max_chars: usize) -> Vec<String> {
    if paragraph.chars().count() <= max_chars {
        return vec![format!("{}\n", paragraph)];
    }

    let sentences: Vec<&str> = paragraph.split(". ").collect();
    let last = sentences.len() - 1;
    let mut pieces: Vec<String> = Vec::new();
    // Separators seen before the first real sentence, e.g. a leading ". . ."
    let mut carry = String::new();

    for (i, sentence) in sentences.into_iter().enumerate() {
        let piece = if i == last { format!("{}\n", sentence) } else { format!("{}. ", sentence) };
        if sentence.trim().is_empty() {
            // Empty sentences keep their separator on a neighbour
            match pieces.last_mut() {
                Some(previous) => previous.push_str(&piece),
                None => carry.push_str(&piece),
            }
        } else {
            carry.push_str(&piece);
            pieces.push(std::mem::take(&mut carry));
        }
    }
    if !carry.is_empty() {
        pieces.push(carry);
    }

    pieces
}

fn flush(buffer: &mut String, chunks: &mut Vec<String>) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    buffer.clear();
}
