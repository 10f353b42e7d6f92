//! Text helpers shared by the summarizers.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tn_core::types::SUMMARY_MAX_CHARS;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref URL_RE: Regex = Regex::new(r"https?://\S+").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r#"[^\w\s.,!?:;()\[\]{}"'-]"#).unwrap();
    static ref NON_WORD_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Collapse whitespace and drop URLs.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let without_urls = URL_RE.replace_all(collapsed.trim(), "");
    WHITESPACE_RE.replace_all(without_urls.trim(), " ").into_owned()
}

/// `clean_text` plus removal of anything that is not a word character,
/// whitespace or ordinary punctuation.
pub fn clean_for_extraction(text: &str) -> String {
    let cleaned = clean_text(text);
    let stripped = SPECIAL_RE.replace_all(&cleaned, "");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split after `.`, `?` or `!` followed by whitespace, except after
/// initialisms such as `e.g.` and `U.S.` and title abbreviations such as `Dr.`.
pub fn split_sentences_raw(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        if !chars[i].is_whitespace() || !matches!(chars[i - 1], '.' | '?' | '!') {
            continue;
        }
        let initialism = i >= 4 && is_word_char(chars[i - 4]) && chars[i - 3] == '.' && is_word_char(chars[i - 2]);
        let abbreviation =
            i >= 3 && chars[i - 3].is_ascii_uppercase() && chars[i - 2].is_ascii_lowercase() && chars[i - 1] == '.';
        if initialism || abbreviation {
            continue;
        }
        let sentence: String = chars[start..i].iter().collect();
        let sentence = sentence.trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = i + 1;
    }

    let tail: String = chars[start.min(chars.len())..].iter().collect();
    let tail = tail.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Sentences long enough to carry meaning (more than 20 characters).
pub fn split_sentences(text: &str) -> Vec<String> {
    split_sentences_raw(text)
        .into_iter()
        .filter(|s| s.chars().count() > 20)
        .collect()
}

/// At most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cap a summary at 250 characters, ending in `...` when cut.
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    format!("{}...", truncate_chars(summary, SUMMARY_MAX_CHARS - 3))
}

/// Cap prompt input at `max` characters, marking the cut with `...`.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    format!("{}...", truncate_chars(text, max))
}

/// Lowercase words longer than three characters.
pub fn significant_words(text: &str) -> HashSet<String> {
    NON_WORD_RE
        .replace_all(&text.to_lowercase(), " ")
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  Read   more at https://example.com/post \n\n today.  "),
            "Read more at today."
        );
    }

    #[test]
    fn test_clean_for_extraction_strips_symbols() {
        assert_eq!(clean_for_extraction("Java™ 21 — ships «now» (finally)!"), "Java 21 ships now (finally)!");
    }

    #[test]
    fn test_split_sentences_respects_abbreviations() {
        let text = "Dr. Smith released the new JDK build today. It supports e.g. virtual threads out of the box! \
                    Does the U.S. team agree with it? Short one.";
        let sentences = split_sentences_raw(text);
        assert_eq!(
            sentences,
            vec![
                "Dr. Smith released the new JDK build today.",
                "It supports e.g. virtual threads out of the box!",
                "Does the U.S. team agree with it?",
                "Short one.",
            ]
        );
        assert_eq!(split_sentences(text).len(), 3);
    }

    #[test]
    fn test_split_without_terminator() {
        assert_eq!(split_sentences_raw("no terminator here"), vec!["no terminator here"]);
        assert!(split_sentences_raw("").is_empty());
    }

    #[test]
    fn test_truncate_summary() {
        let long = "x".repeat(300);
        let truncated = truncate_summary(&long);
        assert_eq!(truncated.chars().count(), 250);
        assert!(truncated.ends_with("..."));

        let exact = "é".repeat(250);
        assert_eq!(truncate_summary(&exact), exact);
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
    }

    #[test]
    fn test_significant_words() {
        let words = significant_words("Java's new GC: faster, smaller heaps!");
        assert!(words.contains("java"));
        assert!(words.contains("faster"));
        assert!(words.contains("heaps"));
        assert!(!words.contains("new"));
    }
}
