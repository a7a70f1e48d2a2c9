//! Text normalization applied before vectorization.
//!
//! Lossy by design of the trained model: only ASCII letters survive, so
//! digits, punctuation, and accented or non-Latin characters are dropped.

use crate::stopwords::StopwordSet;

/// Tokens shorter than this are discarded.
pub const MIN_TOKEN_LEN: usize = 3;

/// Normalize raw text into space-separated lowercase tokens.
///
/// 1. Lowercase.
/// 2. Remove every character that is not `a`-`z` or whitespace.
/// 3. Split on whitespace, including the ASCII information separators.
/// 4. Drop stopwords and tokens of length 2 or less.
/// 5. Join with a single space.
///
/// May return an empty string.
pub fn normalize(text: &str, stopwords: &StopwordSet) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| c.is_ascii_lowercase() || is_separator(c))
        .collect();

    filtered
        .split(is_separator)
        .filter(|token| token.len() >= MIN_TOKEN_LEN && !stopwords.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unicode whitespace plus the ASCII information separators U+001C..U+001F.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
