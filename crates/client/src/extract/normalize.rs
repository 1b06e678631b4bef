//! Blank-line collapsing and whitespace normalization.
//!
//! Both are total `&str -> String` transforms. The whitespace normalizer is
//! idempotent.

use std::sync::LazyLock;

use regex::Regex;

use super::walker::ContentBlock;

static RE_NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static RE_ZERO_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{200B}-\u{200D}\u{FEFF}]").expect("valid regex"));
static RE_SPACE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Zs}+").expect("valid regex"));
static RE_HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\x0B\x0C\r]+").expect("valid regex"));

/// Join rendered blocks with newlines and squeeze blank lines.
///
/// Each `\n\n` pair becomes a single `\n` first, then any remaining run of
/// three or more newlines becomes exactly two.
pub fn collapse_blank_lines(blocks: &[ContentBlock]) -> String {
    let joined = blocks.iter().map(ContentBlock::render).collect::<Vec<_>>().join("\n");
    collapse_newline_runs(&joined.replace("\n\n", "\n"))
}

/// Replace every run of three or more newlines with exactly two.
pub fn collapse_newline_runs(text: &str) -> String {
    RE_NEWLINE_RUN.replace_all(text, "\n\n").into_owned()
}

/// Canonicalize whitespace.
///
/// 1. Delete zero-width characters (U+200B..U+200D, U+FEFF).
/// 2. Collapse runs of Unicode space separators to one ASCII space.
/// 3. Collapse runs of `[ \t\v\f\r]` to one ASCII space. Newlines are kept.
/// 4. Collapse three or more newlines to two.
///
/// Leading indentation on each line is kept at its width (as ASCII spaces)
/// rather than collapsed, so heading and list nesting survives.
pub fn normalize_whitespace(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = RE_ZERO_WIDTH.replace_all(text, "");

    let lines: Vec<String> = text.split('\n').map(normalize_line).collect();

    collapse_newline_runs(&lines.join("\n"))
}

fn normalize_line(line: &str) -> String {
    let body_start = line
        .char_indices()
        .find(|&(_, c)| !is_horizontal_space(c))
        .map_or(line.len(), |(i, _)| i);
    let (indent, body) = line.split_at(body_start);

    // Blank lines carry no indent so newline runs can collapse across them.
    if body.is_empty() {
        return String::new();
    }

    let body = RE_SPACE_SEPARATORS.replace_all(body, " ");
    let body = RE_HORIZONTAL_WS.replace_all(&body, " ");

    let mut out = " ".repeat(indent.chars().count());
    out.push_str(&body);
    out
}

/// ASCII horizontal whitespace or a Unicode space separator (`Zs`).
fn is_horizontal_space(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t'
            | '\x0B'
            | '\x0C'
            | '\r'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::walker::BlockKind;

    fn block(kind: BlockKind, indent: usize, text: &str) -> ContentBlock {
        ContentBlock { kind, indent, text: text.to_string() }
    }

    #[test]
    fn test_collapse_three_newlines_to_two() {
        assert_eq!(collapse_newline_runs("a\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_newline_runs("a\n\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_newline_runs("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_newline_runs("a\nb"), "a\nb");
    }

    #[test]
    fn test_collapse_blank_lines_between_blocks() {
        let blocks = vec![
            block(BlockKind::Heading(1), 0, "Title"),
            block(BlockKind::Paragraph, 0, "Body"),
            block(BlockKind::ListItem, 2, "Item"),
        ];
        // "\nTitle\n" + "\n" + "Body\n" + "\n" + "  - Item"
        assert_eq!(collapse_blank_lines(&blocks), "\nTitle\nBody\n  - Item");
    }

    #[test]
    fn test_collapse_blank_lines_consecutive_headings_keep_blank_line() {
        let blocks = vec![block(BlockKind::Heading(1), 0, "A"), block(BlockKind::Heading(1), 0, "B")];
        assert_eq!(collapse_blank_lines(&blocks), "\nA\n\nB\n");
    }

    #[test]
    fn test_collapse_blank_lines_empty() {
        assert_eq!(collapse_blank_lines(&[]), "");
    }

    #[test]
    fn test_zero_width_removed() {
        let out = normalize_whitespace("Hello \u{200B} World\u{FEFF}");
        assert_eq!(out, "Hello World");
        assert!(!out.contains('\u{200B}'));
    }

    #[test]
    fn test_zero_width_between_letters_joins() {
        assert_eq!(normalize_whitespace("in\u{200C}fo"), "info");
    }

    #[test]
    fn test_space_separators_collapsed() {
        assert_eq!(normalize_whitespace("a\u{00A0}\u{2009}b\u{2003}c"), "a b c");
    }

    #[test]
    fn test_horizontal_whitespace_collapsed_newlines_kept() {
        assert_eq!(normalize_whitespace("a \t\x0B\x0C\r b\nc   d"), "a b\nc d");
    }

    #[test]
    fn test_leading_indentation_preserved() {
        assert_eq!(normalize_whitespace("    Heading\n  - Item   A"), "    Heading\n  - Item A");
    }

    #[test]
    fn test_leading_nbsp_becomes_space() {
        assert_eq!(normalize_whitespace("\u{00A0}\u{00A0}x"), "  x");
    }

    #[test]
    fn test_whitespace_only_lines_become_blank() {
        assert_eq!(normalize_whitespace("a\n\n    \n\n        \n\n    \nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n\u{00A0}\u{3000}\nb"), "a\n\nb");
    }

    #[test]
    fn test_horizontal_space_classification() {
        for c in [' ', '\t', '\r', '\u{00A0}', '\u{2003}', '\u{202F}', '\u{3000}'] {
            assert!(is_horizontal_space(c), "{c:?}");
        }
        for c in ['\n', 'a', '\u{200B}', '-'] {
            assert!(!is_horizontal_space(c), "{c:?}");
        }
    }

    #[test]
    fn test_paragraph_breaks_preserved() {
        assert_eq!(normalize_whitespace("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "",
            "plain",
            "  lead\u{00A0}\u{00A0}and\t\ttabs  \n\n\n\n  next\u{200B}line \r\n",
            "\u{FEFF}\u{2003}\u{2003}x\u{3000}y\n\u{200D}\n\n\nz",
            "\n    Heading\n  - Item\u{202F}A",
        ];
        for s in samples {
            let once = normalize_whitespace(s);
            assert_eq!(normalize_whitespace(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_whitespace(""), "");
    }
}
