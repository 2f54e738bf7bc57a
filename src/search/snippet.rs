//! Titles and highlighted snippets for search results

use crate::lemma::LemmaExtractor;

/// Title used when a page has no usable `<title>`
pub const UNTITLED: &str = "Untitled";

/// Separator placed between snippet windows
pub const SNIPPET_SEPARATOR: &str = " ... ";

/// Extracts the text of the first `<title>` element of a document
///
/// The tag match is ASCII case-insensitive. A missing or empty title yields
/// [`UNTITLED`].
pub fn extract_title(content: &str) -> String {
    // ASCII lowercasing keeps byte offsets valid for `content`
    let lower = content.to_ascii_lowercase();

    let title = lower.find("<title").and_then(|open| {
        let start = open + lower[open..].find('>')? + 1;
        let end = start + lower[start..].find("</title")?;
        Some(content[start..end].trim())
    });

    match title {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => UNTITLED.to_string(),
    }
}

/// Builds a highlighted snippet of `text` for `query`
///
/// For each query word worth highlighting (see
/// [`LemmaExtractor::query_words`]), in query order, the first occurrence in
/// `text` is wrapped in `<b>` tags together with up to `width` characters on
/// each side. Windows are joined with [`SNIPPET_SEPARATOR`]. Words that do
/// not occur contribute nothing, so the snippet may be empty.
///
/// # Arguments
///
/// * `extractor` - Supplies the function-word filter
/// * `text` - Lowercase plain text of the page
/// * `query` - The raw query
/// * `width` - Characters of context on each side of a match
pub fn build_snippet(extractor: &LemmaExtractor, text: &str, query: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut windows = Vec::new();

    for word in extractor.query_words(query) {
        let needle: Vec<char> = word.chars().collect();
        let Some(pos) = find_chars(&chars, &needle) else {
            continue;
        };

        let match_end = pos + needle.len();
        let start = pos.saturating_sub(width);
        let end = (match_end + width).min(chars.len());

        let before: String = chars[start..pos].iter().collect();
        let matched: String = chars[pos..match_end].iter().collect();
        let after: String = chars[match_end..end].iter().collect();
        windows.push(format!("{}<b>{}</b>{}", before, matched, after));
    }

    windows.join(SNIPPET_SEPARATOR)
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
