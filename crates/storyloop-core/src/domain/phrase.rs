//! Phrase rules for submissions.

use serde::Serialize;

/// Maximum number of words in a phrase.
pub const MAX_WORDS: usize = 10;
/// Maximum characters per word.
pub const MAX_WORD_CHARS: usize = 30;
/// Maximum characters of the whole phrase.
pub const MAX_PHRASE_CHARS: usize = 300;

pub const EMPTY_MESSAGE: &str = "Please enter at least one word";
pub const TOO_MANY_WORDS_MESSAGE: &str = "Maximum 10 words allowed";
pub const WORD_TOO_LONG_MESSAGE: &str = "Each word must be 30 characters or less";
pub const TOO_LONG_MESSAGE: &str = "Phrase is too long (max 300 characters)";
pub const PROFANITY_MESSAGE: &str = "Please keep submissions family-friendly";

/// Words rejected anywhere in a phrase, matched whole and case-insensitively.
const BLOCKED_WORDS: [&str; 7] = ["fuck", "shit", "damn", "hell", "bitch", "ass", "crap"];

/// A broken rule, with the message shown to the author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseIssue {
    Empty,
    TooManyWords,
    WordTooLong,
    TooLong,
    Profanity,
}

impl PhraseIssue {
    /// Machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooManyWords => "too_many_words",
            Self::WordTooLong => "word_too_long",
            Self::TooLong => "too_long",
            Self::Profanity => "profanity",
        }
    }

    /// Message for the author.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Empty => EMPTY_MESSAGE,
            Self::TooManyWords => TOO_MANY_WORDS_MESSAGE,
            Self::WordTooLong => WORD_TOO_LONG_MESSAGE,
            Self::TooLong => TOO_LONG_MESSAGE,
            Self::Profanity => PROFANITY_MESSAGE,
        }
    }
}

/// Outcome of checking a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseValidation {
    pub is_valid: bool,
    pub issues: Vec<PhraseIssue>,
    pub word_count: usize,
}

impl PhraseValidation {
    /// Author-facing messages in rule order.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.message()).collect()
    }
}

/// Words of a phrase after trimming.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Number of words in a phrase.
#[must_use]
pub fn word_count(text: &str) -> usize {
    words(text).count()
}

/// Checks every rule and reports all broken ones.
#[must_use]
pub fn validate_phrase(text: &str) -> PhraseValidation {
    let word_count = word_count(text);
    let mut issues = Vec::new();

    if word_count == 0 {
        issues.push(PhraseIssue::Empty);
    }
    if word_count > MAX_WORDS {
        issues.push(PhraseIssue::TooManyWords);
    }
    if words(text).any(|word| word.chars().count() > MAX_WORD_CHARS) {
        issues.push(PhraseIssue::WordTooLong);
    }
    if text.chars().count() > MAX_PHRASE_CHARS {
        issues.push(PhraseIssue::TooLong);
    }
    if contains_blocked_word(text) {
        issues.push(PhraseIssue::Profanity);
    }

    PhraseValidation {
        is_valid: issues.is_empty(),
        issues,
        word_count,
    }
}

/// ASCII word character: letters, digits and `_`.
const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn contains_blocked_word(text: &str) -> bool {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
        .any(|token| BLOCKED_WORDS.iter().any(|blocked| token.eq_ignore_ascii_case(blocked)))
}

/// Trims and collapses runs of whitespace to single spaces.
#[must_use]
pub fn normalize_phrase(text: &str) -> String {
    words(text).collect::<Vec<_>>().join(" ")
}

/// Normalizes and drops everything but ASCII word characters, spaces, `'` and `-`.
#[must_use]
pub fn sanitize_phrase(text: &str) -> String {
    normalize_phrase(text)
        .chars()
        .filter(|&c| is_word_char(c) || matches!(c, ' ' | '\'' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phrase() {
        let result = validate_phrase("  a  brave little   toaster ");
        assert!(result.is_valid);
        assert_eq!(result.word_count, 4);
        assert!(result.messages().is_empty());
    }

    #[test]
    fn test_empty_phrase() {
        let result = validate_phrase("   ");
        assert!(!result.is_valid);
        assert_eq!(result.messages(), vec![EMPTY_MESSAGE]);
        assert_eq!(result.word_count, 0);
    }

    #[test]
    fn test_issues_accumulate_in_rule_order() {
        let long_word = "x".repeat(31);
        let text = format!("damn {long_word} a b c d e f g h i");
        let result = validate_phrase(&text);
        assert_eq!(
            result.issues,
            vec![PhraseIssue::TooManyWords, PhraseIssue::WordTooLong, PhraseIssue::Profanity]
        );
    }

    #[test]
    fn test_too_long_phrase() {
        let text = vec!["y".repeat(30); 10].join(" ");
        let result = validate_phrase(&text);
        assert_eq!(result.issues, vec![PhraseIssue::TooLong]);
    }

    #[test]
    fn test_profanity_needs_whole_words() {
        assert!(validate_phrase("a classic hello").is_valid);
        assert!(validate_phrase("Shellfish party").is_valid);
        assert!(!validate_phrase("what the HELL").is_valid);
    }

    #[test]
    fn test_word_length_counts_characters() {
        let word = "é".repeat(30);
        assert!(validate_phrase(&word).is_valid);
    }

    #[test]
    fn test_normalize_and_sanitize() {
        assert_eq!(normalize_phrase("  the   owl\tflies \n"), "the owl flies");
        assert_eq!(sanitize_phrase(" don't   stop-now! <b>ok</b> "), "don't stop-now bokb");
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        assert!(validate_phrase("éass").issues.contains(&PhraseIssue::Profanity));
        assert!(validate_phrase("passage").is_valid);
        assert_eq!(sanitize_phrase("café au lait!"), "caf au lait");
    }
}
