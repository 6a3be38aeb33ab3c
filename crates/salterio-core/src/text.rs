//! Text canonicalization, excerpts and citation extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum summary length, in characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Maximum number of citations kept from a scraped page.
pub const MAX_PAGE_CITATIONS: usize = 3;

/// Words ignored when building a title's keyword set: articles,
/// prepositions, conjunctions, cycle letters and season names.
const STOP_WORDS: &[&str] = &[
    "el", "la", "los", "las", "un", "una", "y", "o", "de", "del", "al", "en", "con", "por",
    "para", "que", "es", "se", "a", "e", "i", "u", "b", "c", "domingo", "cuaresma", "pascua",
    "adviento", "navidad",
];

/// `<book> <chapter>, <verses>` as written in body text.
static BODY_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]{1,4})\s+(\d+),?\s*(\d+(?:-\d+)?)").expect("valid citation pattern")
});

/// Citation shapes searched in raw page text: comma and period separated.
static PAGE_CITATIONS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"\b([A-Za-z]{1,3})\s+(\d{1,3}),\s*(\d{1,3}(?:-\d{1,3})?)")
            .expect("valid citation pattern"),
        Regex::new(r"\b([A-Za-z]{1,3})\s+(\d{1,3})\.\s*(\d{1,3}(?:-\d{1,3})?)")
            .expect("valid citation pattern"),
    ]
});

fn fold_char(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        '–' | '—' => '-',
        other => other,
    }
}

/// Lower-case, accent-fold, replace punctuation with spaces and collapse
/// whitespace. Word characters and `-` survive; unmapped non-ASCII letters
/// are kept as they are.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.to_lowercase().chars().map(fold_char) {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keyword set of a title: normalized tokens longer than two characters
/// that are not stop words.
pub fn keywords(title: &str) -> HashSet<String> {
    normalize(title)
        .split(' ')
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Where the excerpt starts relative to the anchor word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMode {
    /// Excerpt starts right after the anchor word.
    After,
    /// Excerpt starts at the anchor word itself.
    Including,
}

/// Up to [`SUMMARY_MAX_CHARS`] characters near the first anchor word found
/// (anchors are tried in order, case-insensitively), or the head of the text
/// when no anchor matches or the anchored excerpt is empty.
pub fn summarize(text: &str, anchors: &[&str], mode: AnchorMode) -> String {
    let chars: Vec<char> = text.chars().collect();
    let lowered: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    for anchor in anchors {
        let needle: Vec<char> = anchor.to_lowercase().chars().collect();
        if let Some(pos) = find_chars(&lowered, &needle) {
            let start = match mode {
                AnchorMode::After => pos + needle.len(),
                AnchorMode::Including => pos,
            };
            let excerpt: String = chars[start..]
                .iter()
                .take(SUMMARY_MAX_CHARS)
                .collect::<String>()
                .trim()
                .to_string();
            if !excerpt.is_empty() {
                return excerpt;
            }
            break;
        }
    }

    truncate_chars(text, SUMMARY_MAX_CHARS).trim().to_string()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// All `<book> <chapter>, <verses>` citations in body text, in order,
/// joined with `"; "`.
pub fn extract_readings(text: &str) -> String {
    BODY_CITATION
        .captures_iter(text)
        .map(|c| format!("{} {}, {}", &c[1], &c[2], &c[3]))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Citation-like substrings of a raw page, ordered by first appearance,
/// duplicates removed, at most [`MAX_PAGE_CITATIONS`].
pub fn extract_page_citations(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = PAGE_CITATIONS
        .iter()
        .flat_map(|re| {
            re.captures_iter(text).filter_map(|c| {
                let whole = c.get(0)?;
                Some((whole.start(), format!("{} {}, {}", &c[1], &c[2], &c[3])))
            })
        })
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, citation)| citation)
        .filter(|c| seen.insert(c.clone()))
        .take(MAX_PAGE_CITATIONS)
        .collect()
}
