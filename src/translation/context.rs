/// Default number of characters carried from one chunk to the next
pub const DEFAULT_CONTEXT_CHARS: usize = 1500;

/// Rolling continuity context for the next chunk's prompt.
///
/// Only the tail of the most recent chunk (source and translation) is kept,
/// so memory stays bounded however long the book is. The window lives for
/// one run and carries across chapter boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextWindow {
    original_tail: String,
    translated_tail: String,
    capacity: usize,
}

impl ContextWindow {
    /// Empty window keeping at most `capacity` chars of each side
    pub fn new(capacity: usize) -> Self {
        Self {
            original_tail: String::new(),
            translated_tail: String::new(),
            capacity,
        }
    }

    /// Window with preset tails, trimmed to capacity
    pub fn with_tails(capacity: usize, original: &str, translated: &str) -> Self {
        let mut window = Self::new(capacity);
        window.update(original, translated);
        window
    }

    /// `(original_tail, translated_tail)`
    pub fn current(&self) -> (&str, &str) {
        (&self.original_tail, &self.translated_tail)
    }

    /// Replace both tails with the last `capacity` chars of the given chunk
    pub fn update(&mut self, original_chunk: &str, translated_chunk: &str) {
        self.original_tail = tail_chars(original_chunk, self.capacity).to_string();
        self.translated_tail = tail_chars(translated_chunk, self.capacity).to_string();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.original_tail.is_empty() && self.translated_tail.is_empty()
    }
}

/// Last `n` chars of `text`, on a char boundary
fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
