//! Substring search with highlight and snippet support.
//!
//! Matching is case-insensitive substring containment; there is no ranking
//! and no index. Highlighting and snippets produce neutral span lists so
//! any rendering layer (terminal, graph view, sidebar) can decide how to
//! emphasize matched text.
//!
//! All operations here are pure: they read their arguments, allocate fresh
//! output, and hold no state between calls.

use std::env;

/// A run of text produced by [`highlight`] or [`snippet`].
///
/// Spans flagged `highlighted` matched the query case-insensitively and
/// keep their original casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// The text of this run, with original casing preserved.
    pub text: String,
    /// Whether this run matched the query.
    pub highlighted: bool,
}

impl HighlightSpan {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

/// Result of matching a query against one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Whether the text contains the query (always true for empty queries).
    pub matches: bool,
    /// The full text split into highlighted and plain spans.
    pub highlighted: Vec<HighlightSpan>,
    /// A bounded-context window around the first occurrence, if any.
    pub snippet: Option<Vec<HighlightSpan>>,
}

/// Context window sizes for [`snippet`], in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetConfig {
    /// Characters of context kept before the match start (default 20).
    pub context_before: usize,
    /// Characters of context kept after the match end (default 40).
    pub context_after: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            context_before: 20,
            context_after: 40,
        }
    }
}

impl SnippetConfig {
    /// Parses configuration from environment variables.
    ///
    /// Falls back to defaults when env vars are not set or invalid.
    ///
    /// # Environment Variables
    ///
    /// - `SYNAPSE_SNIPPET_BEFORE` (usize, default 20): context before the match
    /// - `SYNAPSE_SNIPPET_AFTER` (usize, default 40): context after the match
    pub fn from_env() -> Self {
        let context_before = env::var("SYNAPSE_SNIPPET_BEFORE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let context_after = env::var("SYNAPSE_SNIPPET_AFTER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(40);

        Self {
            context_before,
            context_after,
        }
    }
}

/// Case-folded characters of `s`, one per input character.
///
/// Multi-character lowercase expansions keep only their first character so
/// indices stay aligned with the original text.
fn folded_chars(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// First occurrence of `needle` in `haystack` at or after `from`, as a
/// character index. Both slices must already be case-folded.
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Reports whether `text` contains `query`, case-insensitively.
///
/// An empty query always matches; it means "no filtering".
///
/// # Examples
///
/// ```
/// use synapse::search::matches;
///
/// assert!(matches("Grocery List", "grocer"));
/// assert!(matches("anything at all", ""));
/// assert!(!matches("Grocery List", "recipe"));
/// ```
pub fn matches(text: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    find_from(&folded_chars(text), &folded_chars(query), 0).is_some()
}

/// Splits `text` into spans on case-insensitive occurrences of `query`.
///
/// Occurrences are flagged for emphasis; every span keeps the original
/// casing of the source text. An empty query or a query with no occurrence
/// yields a single plain span carrying the whole text.
///
/// # Examples
///
/// ```
/// use synapse::search::highlight;
///
/// let spans = highlight("Rust and RUST", "rust");
/// assert_eq!(spans.len(), 3);
/// assert_eq!(spans[0].text, "Rust");
/// assert!(spans[0].highlighted);
/// assert_eq!(spans[1].text, " and ");
/// assert_eq!(spans[2].text, "RUST");
/// ```
pub fn highlight(text: &str, query: &str) -> Vec<HighlightSpan> {
    if text.is_empty() {
        return Vec::new();
    }
    if query.is_empty() {
        return vec![HighlightSpan::plain(text)];
    }

    let chars: Vec<char> = text.chars().collect();
    let haystack = folded_chars(text);
    let needle = folded_chars(query);

    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_from(&haystack, &needle, pos) {
        if start > pos {
            spans.push(HighlightSpan::plain(
                chars[pos..start].iter().collect::<String>(),
            ));
        }
        spans.push(HighlightSpan::emphasized(
            chars[start..start + needle.len()].iter().collect::<String>(),
        ));
        pos = start + needle.len();
    }

    if pos < chars.len() {
        spans.push(HighlightSpan::plain(
            chars[pos..].iter().collect::<String>(),
        ));
    }

    spans
}

/// Produces a highlighted, bounded-context window around the first
/// case-insensitive occurrence of `query` in `content`.
///
/// The window spans `config.context_before` characters before the match
/// start through `config.context_after` characters after the match end,
/// clamped to the content bounds. A `...` marker is prepended when the
/// window starts after the true start of the content and appended when it
/// ends before the true end.
///
/// Returns `None` when the query is empty or does not occur in the content;
/// that is a normal "no snippet" result, not an error.
///
/// # Examples
///
/// ```
/// use synapse::search::{SnippetConfig, snippet};
///
/// let spans = snippet("a note about the rust borrow checker", "borrow", &SnippetConfig::default())
///     .expect("query occurs in content");
/// let text: String = spans.iter().map(|s| s.text.as_str()).collect();
/// assert!(text.contains("borrow"));
/// ```
pub fn snippet(content: &str, query: &str, config: &SnippetConfig) -> Option<Vec<HighlightSpan>> {
    if query.is_empty() || content.is_empty() {
        return None;
    }

    let chars: Vec<char> = content.chars().collect();
    let haystack = folded_chars(content);
    let needle = folded_chars(query);

    let index = find_from(&haystack, &needle, 0)?;

    let start = index.saturating_sub(config.context_before);
    let end = (index + needle.len() + config.context_after).min(chars.len());
    let window: String = chars[start..end].iter().collect();

    let mut spans = Vec::new();
    if start > 0 {
        spans.push(HighlightSpan::plain("..."));
    }
    spans.extend(highlight(&window, query));
    if end < chars.len() {
        spans.push(HighlightSpan::plain("..."));
    }

    Some(spans)
}

/// Matches `query` against `text` and renders both the highlighted text and
/// a snippet in one call, using the default snippet window.
///
/// # Examples
///
/// ```
/// use synapse::match_and_highlight;
///
/// let result = match_and_highlight("The Rust Book", "rust");
/// assert!(result.matches);
/// assert!(result.highlighted.iter().any(|s| s.highlighted));
///
/// // Empty queries always match and never produce a snippet.
/// let result = match_and_highlight("anything", "");
/// assert!(result.matches);
/// assert!(result.snippet.is_none());
/// ```
pub fn match_and_highlight(text: &str, query: &str) -> SearchMatch {
    SearchMatch {
        matches: matches(text, query),
        highlighted: highlight(text, query),
        snippet: snippet(text, query, &SnippetConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn joined(spans: &[HighlightSpan]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn empty_query_always_matches() {
        assert!(matches("", ""));
        assert!(matches("some text", ""));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(matches("Grocery LIST", "list"));
        assert!(matches("grocery list", "LIST"));
    }

    #[test]
    fn absent_query_does_not_match() {
        assert!(!matches("grocery list", "recipe"));
        assert!(!matches("", "recipe"));
    }

    #[test]
    fn highlight_preserves_original_casing() {
        let spans = highlight("Rust and RUST and rust", "rust");
        assert_eq!(
            spans,
            vec![
                HighlightSpan::emphasized("Rust"),
                HighlightSpan::plain(" and "),
                HighlightSpan::emphasized("RUST"),
                HighlightSpan::plain(" and "),
                HighlightSpan::emphasized("rust"),
            ]
        );
    }

    #[test]
    fn highlight_without_occurrence_is_single_plain_span() {
        let spans = highlight("no match here", "xyz");
        assert_eq!(spans, vec![HighlightSpan::plain("no match here")]);
    }

    #[test]
    fn highlight_with_empty_query_passes_text_through() {
        let spans = highlight("as is", "");
        assert_eq!(spans, vec![HighlightSpan::plain("as is")]);
    }

    #[test]
    fn highlight_reconstructs_the_input() {
        let text = "Repeat repeat REPEAT";
        assert_eq!(joined(&highlight(text, "repeat")), text);
    }

    #[test]
    fn highlight_adjacent_occurrences() {
        let spans = highlight("aaaa", "aa");
        assert_eq!(
            spans,
            vec![
                HighlightSpan::emphasized("aa"),
                HighlightSpan::emphasized("aa"),
            ]
        );
    }

    #[test]
    fn snippet_window_is_clamped_to_content_bounds() {
        // Query "m" sits at character index 22; the window runs from
        // 22 - 20 = 2 to min(36, 22 + 1 + 40) = 36.
        let content = "0123456789abcdefghijklmnopqrstuvwxyz";
        let spans = snippet(content, "m", &SnippetConfig::default()).expect("match exists");

        assert_eq!(spans[0], HighlightSpan::plain("..."));
        assert_eq!(joined(&spans), "...23456789abcdefghijklmnopqrstuvwxyz");
        // End of window reached the end of content, so no trailing marker.
        assert!(!spans.last().unwrap().text.contains("..."));
        assert!(spans.iter().any(|s| s.highlighted && s.text == "m"));
    }

    #[test]
    fn snippet_truncates_both_ends() {
        let content = "x".repeat(50) + "NEEDLE" + &"y".repeat(50);
        let spans =
            snippet(&content, "needle", &SnippetConfig::default()).expect("match exists");

        assert_eq!(spans.first().unwrap(), &HighlightSpan::plain("..."));
        assert_eq!(spans.last().unwrap(), &HighlightSpan::plain("..."));
        let text = joined(&spans);
        assert_eq!(text, format!("...{}NEEDLE{}...", "x".repeat(20), "y".repeat(40)));
    }

    #[test]
    fn snippet_at_content_start_has_no_leading_marker() {
        let spans = snippet("match right away then more text", "match", &SnippetConfig::default())
            .expect("match exists");
        assert_eq!(spans[0], HighlightSpan::emphasized("match"));
    }

    #[test]
    fn snippet_is_none_when_query_absent() {
        assert!(snippet("some content", "missing", &SnippetConfig::default()).is_none());
    }

    #[test]
    fn snippet_is_none_for_empty_query_or_content() {
        assert!(snippet("content", "", &SnippetConfig::default()).is_none());
        assert!(snippet("", "query", &SnippetConfig::default()).is_none());
    }

    #[test]
    fn match_and_highlight_combines_all_three() {
        let result = match_and_highlight("finding the needle in here", "needle");
        assert!(result.matches);
        assert!(result.highlighted.iter().any(|s| s.highlighted));
        assert!(result.snippet.is_some());
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        assert!(matches("", ""));
        assert!(highlight("", "q").is_empty());
        assert!(snippet("", "", &SnippetConfig::default()).is_none());
        assert!(!matches("short", "much longer than the text"));
    }

    #[test]
    #[serial]
    fn snippet_config_reads_environment_overrides() {
        unsafe {
            env::set_var("SYNAPSE_SNIPPET_BEFORE", "5");
            env::set_var("SYNAPSE_SNIPPET_AFTER", "10");
        }

        let config = SnippetConfig::from_env();
        assert_eq!(config.context_before, 5);
        assert_eq!(config.context_after, 10);

        unsafe {
            env::remove_var("SYNAPSE_SNIPPET_BEFORE");
            env::remove_var("SYNAPSE_SNIPPET_AFTER");
        }
    }

    #[test]
    #[serial]
    fn snippet_config_falls_back_on_invalid_values() {
        unsafe {
            env::set_var("SYNAPSE_SNIPPET_BEFORE", "not-a-number");
        }

        let config = SnippetConfig::from_env();
        assert_eq!(config.context_before, 20);
        assert_eq!(config.context_after, 40);

        unsafe {
            env::remove_var("SYNAPSE_SNIPPET_BEFORE");
        }
    }
}
