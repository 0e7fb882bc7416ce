//! The plus/minus query mini-language.
//!
//! A raw query is a whitespace-separated list of words; a leading `-` marks
//! a word the results must not contain. Parsing validates syntax first
//! (control characters, a bare `-`, a doubled `--`) and only then drops
//! stop words, so a minus-marked stop word is still checked for illegal
//! minus syntax before it is discarded.

use std::collections::BTreeSet;

use crate::error::SearchError;
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, split_into_words};

/// A parsed query: words that must match and words that must not.
///
/// Both sides have set semantics; duplicates collapse and order does not
/// affect the result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub plus_words: BTreeSet<String>,
    pub minus_words: BTreeSet<String>,
}

struct QueryWord<'a> {
    data: &'a str,
    is_minus: bool,
    is_stop: bool,
}

impl Query {
    /// Parse `text` against the given stop-word set.
    ///
    /// An empty query (or one made entirely of stop words) is not an
    /// error; it parses to a query with empty word sets.
    pub fn parse(stop_words: &StopWords, text: &str) -> Result<Query, SearchError> {
        let mut query = Query::default();
        for word in split_into_words(text) {
            let parsed = parse_query_word(stop_words, word)?;
            if parsed.is_stop {
                continue;
            }
            if parsed.is_minus {
                query.minus_words.insert(parsed.data.to_string());
            } else {
                query.plus_words.insert(parsed.data.to_string());
            }
        }
        Ok(query)
    }

    pub fn is_empty(&self) -> bool {
        self.plus_words.is_empty() && self.minus_words.is_empty()
    }
}

fn parse_query_word<'a>(
    stop_words: &StopWords,
    text: &'a str,
) -> Result<QueryWord<'a>, SearchError> {
    if !is_valid_word(text) {
        return Err(SearchError::InvalidWord(text.to_string()));
    }
    if text == "-" {
        return Err(SearchError::EmptyMinusWord);
    }
    if text.starts_with("--") {
        return Err(SearchError::DoubleMinus(text.to_string()));
    }
    let (data, is_minus) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    Ok(QueryWord {
        data,
        is_minus,
        is_stop: stop_words.contains(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_words() -> StopWords {
        StopWords::from_text("и в на").unwrap()
    }

    #[test]
    fn classifies_plus_and_minus_words() {
        let query = Query::parse(&stop_words(), "пушистый -пёс хвост").unwrap();
        assert_eq!(
            query.plus_words,
            BTreeSet::from(["пушистый".to_string(), "хвост".to_string()])
        );
        assert_eq!(query.minus_words, BTreeSet::from(["пёс".to_string()]));
    }

    #[test]
    fn duplicates_collapse() {
        let query = Query::parse(&stop_words(), "кот кот -пёс -пёс").unwrap();
        assert_eq!(query.plus_words.len(), 1);
        assert_eq!(query.minus_words.len(), 1);
    }

    #[test]
    fn stop_words_are_dropped_from_both_sides() {
        let query = Query::parse(&stop_words(), "кот и -на").unwrap();
        assert_eq!(query.plus_words, BTreeSet::from(["кот".to_string()]));
        assert!(query.minus_words.is_empty());
    }

    #[test]
    fn bare_minus_is_rejected() {
        let err = Query::parse(&stop_words(), "пушистый -").unwrap_err();
        assert_eq!(err, SearchError::EmptyMinusWord);
    }

    #[test]
    fn double_minus_is_rejected() {
        let err = Query::parse(&stop_words(), "пушистый --кот").unwrap_err();
        assert_eq!(err, SearchError::DoubleMinus("--кот".to_string()));
    }

    #[test]
    fn double_minus_before_a_stop_word_is_still_rejected() {
        // Syntax validation runs before stop-word classification.
        let err = Query::parse(&stop_words(), "--и").unwrap_err();
        assert_eq!(err, SearchError::DoubleMinus("--и".to_string()));
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = Query::parse(&stop_words(), "скво\x12рец").unwrap_err();
        assert_eq!(err, SearchError::InvalidWord("скво\x12рец".to_string()));
    }

    #[test]
    fn empty_query_parses_to_empty_sets() {
        let query = Query::parse(&stop_words(), "и в на").unwrap();
        assert!(query.is_empty());
    }
}
