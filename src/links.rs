//! Wiki-style link extraction.
//!
//! Notes reference each other with `[[Title]]` syntax embedded in their
//! Markdown content. This module pulls those references out of raw text;
//! resolving them against actual note titles happens in [`crate::graph`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]*)\]\]").expect("link regex"));

/// Extracts all unique wiki-style link targets from the given text.
///
/// A target is the text between `[[` and the nearest following `]]`; it may
/// not contain a closing bracket. Targets are trimmed of surrounding
/// whitespace and deduplicated within the input, keeping first-occurrence
/// order. Malformed syntax such as an unmatched `[[` is not a match and is
/// silently skipped. A target that is only whitespace trims to the empty
/// string, matching the degenerate `[[ ]]` case in existing note content.
///
/// # Examples
///
/// ```
/// use synapse::extract_links;
///
/// let links = extract_links("See [[Alpha]] and [[Beta]] and [[Alpha]]");
/// assert_eq!(links, vec!["Alpha", "Beta"]);
///
/// assert!(extract_links("broken [[Alpha").is_empty());
/// ```
pub fn extract_links(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for cap in LINK_REGEX.captures_iter(content) {
        let inner = &cap[1];
        if inner.is_empty() {
            continue;
        }

        let target = inner.trim().to_string();
        if seen.insert(target.clone()) {
            links.push(target);
        }
    }

    links
}
