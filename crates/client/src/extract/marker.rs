//! Marker-based content bounding.
//!
//! TYPO3 wraps the indexable part of a page in `TYPO3SEARCH_begin` /
//! `TYPO3SEARCH_end` comments. The begin marker is located in the raw HTML
//! before parsing, since the parser discards comments. The end marker is
//! applied to the extracted text.

/// Prefix of CMS-injected inline script lines that leak into text.
const SCRIPT_ARTIFACT_PREFIX: &str = "window.flow";

/// Return everything after the first occurrence of `marker`, or `html` unchanged.
pub fn bound_after_marker<'a>(html: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return html;
    }
    match html.find(marker) {
        Some(pos) => &html[pos + marker.len()..],
        None => html,
    }
}

/// Cut `text` at the last occurrence of `marker`, drop script artifact lines, trim.
pub fn truncate_tail(text: &str, marker: &str) -> String {
    let text = match text.rfind(marker) {
        Some(pos) if !marker.is_empty() => &text[..pos],
        _ => text,
    };

    text.lines()
        .filter(|line| !line.trim().starts_with(SCRIPT_ARTIFACT_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
