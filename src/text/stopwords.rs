//! English stop word filtering.
//!
//! Stop words are high-frequency words that carry little ranking signal.
//! The vectorizer discounts them entirely by dropping them before any
//! frequency counting happens.

use std::collections::HashSet;

/// Common English stop words, the usual article/pronoun/preposition/
/// auxiliary-verb core shared by the NLTK and scikit-learn lists.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just",
    "may", "me", "might", "more", "most", "must", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "shall", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "upon", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Set-backed stop word filter with O(1) membership checks.
///
/// # Examples
///
/// ```
/// use recomendar::text::StopWords;
///
/// let stop_words = StopWords::english();
/// assert!(stop_words.is_stop_word("the"));
/// assert!(!stop_words.is_stop_word("coffee"));
/// ```
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Build a filter from custom words. Matching is done on lowercase
    /// tokens, so the words are lowercased on the way in.
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// The default English filter.
    #[must_use]
    pub fn english() -> Self {
        Self::new(ENGLISH_STOP_WORDS)
    }

    /// Whether `word` is a stop word. Expects a lowercase token.
    #[must_use]
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of words in the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the filter contains no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_contains_core_words() {
        let sw = StopWords::english();
        for word in ["the", "and", "is", "with", "of"] {
            assert!(sw.is_stop_word(word), "{word} should be a stop word");
        }
    }

    #[test]
    fn test_content_words_pass() {
        let sw = StopWords::english();
        for word in ["coffee", "gym", "bakery", "lisbon"] {
            assert!(!sw.is_stop_word(word), "{word} should not be a stop word");
        }
    }

    #[test]
    fn test_custom_words_lowercased() {
        let sw = StopWords::new(["FOO", "Bar"]);
        assert!(sw.is_stop_word("foo"));
        assert!(sw.is_stop_word("bar"));
        assert_eq!(sw.len(), 2);
    }

    #[test]
    fn test_list_has_no_duplicates() {
        let unique: HashSet<&str> = ENGLISH_STOP_WORDS.iter().copied().collect();
        assert_eq!(unique.len(), ENGLISH_STOP_WORDS.len());
    }

    #[test]
    fn test_empty_filter() {
        let sw = StopWords::new(Vec::<String>::new());
        assert!(sw.is_empty());
        assert!(!sw.is_stop_word("anything"));
    }
}
