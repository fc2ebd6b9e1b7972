//! Hashtag extraction.
//!
//! Tags are inline `#tag` tokens written directly in note content. There is
//! no tag table; the collection-level tag cloud is derived by
//! [`crate::service::NoteService::tag_cloud`].

use std::sync::LazyLock;

use regex::Regex;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(#[A-Za-z0-9_-]+)").expect("tag regex"));

/// Extracts all `#tag` tokens from the given text.
///
/// A tag is `#` followed by one or more letters, digits, underscores, or
/// hyphens. The `#` must sit at the start of the text or after whitespace,
/// so fragments glued to preceding text (`http://x.com#anchor`) are not
/// tags. The match is greedy over the tag character set, which subsumes
/// word characters, so a tag token is never followed by a word character.
///
/// Tokens keep their leading `#` and are returned in occurrence order
/// without deduplication.
///
/// # Examples
///
/// ```
/// use synapse::extract_tags;
///
/// let tags = extract_tags("hello #world, visit #foo-bar_baz now #a1");
/// assert_eq!(tags, vec!["#world", "#foo-bar_baz", "#a1"]);
///
/// assert!(extract_tags("url#notATag http://x.com#anchor").is_empty());
/// ```
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG_REGEX
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}
