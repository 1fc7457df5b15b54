/// Byte order mark some editors leave at the start of exported text
const BOM: char = '\u{feff}';

/// Clean raw chapter text: drop carriage returns and byte order marks, then
/// trim surrounding whitespace.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '\r' && *c != BOM).collect();
    cleaned.trim().to_string()
}
