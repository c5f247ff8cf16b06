//! Word tokenization for business text fields.

/// Split text into lowercase alphanumeric tokens.
///
/// Runs of alphanumeric characters form tokens; everything else is a
/// separator. Single-character tokens carry no signal for this corpus and
/// are dropped.
///
/// # Examples
///
/// ```
/// use recomendar::text::tokenize;
///
/// let tokens = tokenize("Joe's Cafe, Downtown!");
/// assert_eq!(tokens, vec!["joe", "cafe", "downtown"]);
///
/// assert!(tokenize("").is_empty());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases() {
        assert_eq!(tokenize("Blue BOTTLE"), vec!["blue", "bottle"]);
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("coffee,tea;and-cake"),
            vec!["coffee", "tea", "and", "cake"]
        );
    }

    #[test]
    fn test_tokenize_drops_single_chars() {
        assert_eq!(tokenize("a b cd"), vec!["cd"]);
    }

    #[test]
    fn test_tokenize_keeps_digits() {
        assert_eq!(tokenize("open 24 hours"), vec!["open", "24", "hours"]);
    }

    #[test]
    fn test_tokenize_whitespace_only() {
        assert!(tokenize("   \t\n ").is_empty());
    }

    #[test]
    fn test_tokenize_accented_words_survive() {
        assert_eq!(tokenize("Café São"), vec!["café", "são"]);
    }
}
