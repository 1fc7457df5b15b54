use once_cell::sync::Lazy;
use regex::Regex;

/// "Here is the translation:" style openers, up to and including the colon.
/// The line must name the translation itself, so narrative "Here is ...:" stays.
static HERE_IS_LEAD_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Here(?: is|'s) (?:the|your|a) (?:[\w-]+ )*?(?:translation|translated text|version)[^:\n]*:")
        .expect("Invalid lead-in regex")
});

/// Fixed openers models like to put before the actual answer
const BOILERPLATE_PREFIXES: &[&str] = &["Translation:", "Translated:", "Output:", "Sure,", "Okay,"];

/// Strip conversational lead-ins from a model response.
///
/// Lead-ins are removed one after another until the text starts with real
/// content, so the result is stable under repeated application.
pub fn sanitize(text: &str) -> String {
    let mut current = text.trim();

    loop {
        if let Some(found) = HERE_IS_LEAD_IN.find(current) {
            current = current[found.end()..].trim();
            continue;
        }

        match BOILERPLATE_PREFIXES.iter().find(|prefix| current.starts_with(**prefix)) {
            Some(prefix) => current = current[prefix.len()..].trim(),
            None => break,
        }
    }

    current.to_string()
}
