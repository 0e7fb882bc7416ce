//! Whitespace tokenization and word validation.
//!
//! Splitting is zero-copy: the returned words borrow from the input text,
//! which must outlive every derived slice. Whatever owns words long-term
//! (the inverted index) copies them into its own storage.

/// Split `text` into words on whitespace, preserving order.
///
/// Never merges, validates, or lowercases; empty slices between separators
/// are skipped.
#[inline]
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// A valid word contains no control characters (code points in [0, 0x20)).
#[inline]
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| (c as u32) < 0x20)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_preserves_order_and_skips_runs_of_spaces() {
        assert_eq!(
            split_into_words("  curly  cat   curly tail "),
            vec!["curly", "cat", "curly", "tail"]
        );
    }

    #[test]
    fn split_of_empty_or_blank_text_is_empty() {
        assert!(split_into_words("").is_empty());
        assert!(split_into_words("   ").is_empty());
    }

    #[test]
    fn split_keeps_duplicates_and_markers() {
        // The tokenizer does not interpret minus markers; that is the
        // query parser's job.
        assert_eq!(split_into_words("-cat -cat"), vec!["-cat", "-cat"]);
    }

    #[test]
    fn words_with_control_characters_are_invalid() {
        assert!(is_valid_word("скворец"));
        assert!(!is_valid_word("скво\x12рец"));
        assert!(!is_valid_word("\x00"));
        assert!(is_valid_word(""));
    }
}
