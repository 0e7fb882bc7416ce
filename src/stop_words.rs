use std::collections::BTreeSet;

use crate::error::SearchError;
use crate::tokenizer::{is_valid_word, split_into_words};

/// A fixed set of words excluded from indexing and from query terms.
///
/// Built once at engine construction; deduplicates and discards empty
/// strings. Construction fails if any stop word contains a control
/// character.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// Build from any sequence of words.
    pub fn new<I, S>(words: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(SearchError::InvalidWord(word.to_string()));
            }
            set.insert(word.to_string());
        }
        Ok(StopWords { words: set })
    }

    /// Build from a whitespace-delimited string such as `"и в на"`.
    pub fn from_text(text: &str) -> Result<Self, SearchError> {
        Self::new(split_into_words(text))
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
