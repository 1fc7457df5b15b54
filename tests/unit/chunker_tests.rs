/*!
 * Tests for chunking, context carry-over and sanitizing
 */

use bookwai::translation::{chunk_text, normalize, sanitize, split_into_chunks, ContextWindow};

/// Paragraphs with awkward sentence punctuation
const AWKWARD_INPUTS: &[&str] = &[
    "He paused. . . and then spoke again. Nobody answered him. The fire cracked.",
    ". . . a leading ellipsis opens this paragraph. And then more follows.",
    "Two  spaces.  After periods.   Three here. Done.\n\nA second paragraph. Short.",
    "No sentence breaks at all in this rather long single line of words",
    "Dots....without spaces. Then. . .\nराम वन गए. . . सीता साथ थीं. लक्ष्मण भी.",
    "A.  . B. . . . C",
];

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn test_chunkText_withParagraphsAndBudget_shouldNeverExceedBudget() {
    let text = (1..=30)
        .map(|i| format!("Paragraph number {} talks about the road ahead.", i))
        .collect::<Vec<_>>()
        .join("\n\n");

    let chunks = chunk_text(&text, 200);

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 200));
    assert!(chunks.iter().all(|c| !c.trim().is_empty()));
    // Paragraphs are never cut when they fit on their own
    for chunk in &chunks {
        for line in chunk.lines() {
            assert!(line.starts_with("Paragraph number"), "unexpected line: {}", line);
            assert!(line.ends_with("ahead."));
        }
    }
}

#[test]
fn test_chunkText_withSmallText_shouldReturnOneTrimmedChunk() {
    assert_eq!(chunk_text("\u{feff}  Hello  \r\n", 7000), vec!["Hello"]);
}

#[test]
fn test_splitIntoChunks_shouldNumberChunksInOrder() {
    let chunks = split_into_chunks("First part here.\nSecond part here.\nThird part here.", 20);

    assert_eq!(chunks.len(), 3);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.total, 3);
    }
    assert_eq!(chunks[2].part_label(), "(Part 3/3)");
    assert_eq!(chunks[0].char_len(), "First part here.".chars().count());
}

#[test]
fn test_normalize_shouldStripCarriageReturnsAndBom() {
    assert_eq!(normalize("\u{feff}line one\r\nline two\r\n"), "line one\nline two");
    assert_eq!(normalize(" \r\n "), "");
}

#[test]
fn test_contextWindow_shouldKeepOnlyTheLatestTail() {
    let mut context = ContextWindow::new(5);
    assert!(context.is_empty());

    context.update("first original", "first translated");
    context.update("abcdefgh", "ABCDEFGH");

    assert_eq!(context.current(), ("defgh", "DEFGH"));
    assert_eq!(context.capacity(), 5);
}

#[test]
fn test_contextWindow_withShortChunk_shouldKeepItWhole() {
    let context = ContextWindow::with_tails(1500, "short", "छोटा");
    assert_eq!(context.current(), ("short", "छोटा"));
}

#[test]
fn test_sanitize_shouldDropLeadInsButKeepBody() {
    assert_eq!(sanitize("Here is the translation:\nनमस्ते"), "नमस्ते");
    assert_eq!(sanitize("Translation: Output: नमस्ते"), "नमस्ते");
    assert_eq!(sanitize("Plain text stays."), "Plain text stays.");
}

#[test]
fn test_chunkText_withAwkwardPunctuation_shouldKeepEveryCharAtEveryBudget() {
    for input in AWKWARD_INPUTS {
        for max in 1..=60 {
            let chunks = chunk_text(input, max);

            assert_eq!(squash(&chunks.join("\n")), squash(input), "lost text for {:?} at {}", input, max);
            for chunk in &chunks {
                assert!(!chunk.trim().is_empty());
                // Only a single uncuttable sentence may go over budget
                assert!(
                    chunk.chars().count() <= max || !chunk.contains('\n'),
                    "chunk {:?} over budget {} for {:?}",
                    chunk,
                    max,
                    input
                );
            }
        }
    }
}

#[test]
fn test_chunkText_withSpacedEllipsisInLongParagraph_shouldKeepAllDots() {
    let text = format!("{}He paused. . . and then spoke again", "word ".repeat(10));

    let chunks = chunk_text(&text, 30);

    assert!(squash(&chunks.join(" ")).contains("He paused. . . and then"));
}
