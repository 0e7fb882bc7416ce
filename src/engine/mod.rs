//! The search-server orchestrator: document ingestion, the inverted index,
//! TF-IDF ranked retrieval, and single-document matching.
//!
//! The engine exclusively owns the forward index (word -> document ->
//! term frequency), the symmetric reverse index kept so removal costs
//! O(document word count), and the document store. Mutation is assumed to
//! be externally serialized (single-writer discipline); read-only queries
//! may run concurrently and keep their working state in a per-call
//! [`ConcurrentMap`](crate::concurrent_map::ConcurrentMap).

mod parallel;

pub use parallel::ExecutionPolicy;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::document::{average_rating, Document, DocumentId, DocumentStatus};
use crate::error::SearchError;
use crate::query::Query;
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, split_into_words};

/// Ranked searches return at most this many results.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are considered tied and fall back to the
/// rating comparison.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct DocumentData {
    rating: i32,
    status: DocumentStatus,
}

/// An in-memory TF-IDF document search engine.
pub struct SearchServer {
    stop_words: StopWords,
    /// Forward index: word -> (document id -> term frequency). The keys own
    /// their storage; documents come and go while a word may persist across
    /// the survivors.
    word_to_document_freqs: IndexMap<Box<str>, BTreeMap<DocumentId, f64>>,
    /// Reverse index: document id -> (word -> term frequency).
    document_to_word_freqs: BTreeMap<DocumentId, BTreeMap<Box<str>, f64>>,
    documents: BTreeMap<DocumentId, DocumentData>,
}

impl SearchServer {
    /// Create an engine with the given stop words.
    ///
    /// Fails if any stop word contains a control character.
    pub fn new<I, S>(stop_words: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::with_stop_words(StopWords::new(stop_words)?))
    }

    /// Create an engine from a whitespace-delimited stop-word string such
    /// as `"и в на"`.
    pub fn from_stop_words_text(text: &str) -> Result<Self, SearchError> {
        Ok(Self::with_stop_words(StopWords::from_text(text)?))
    }

    fn with_stop_words(stop_words: StopWords) -> Self {
        SearchServer {
            stop_words,
            word_to_document_freqs: IndexMap::new(),
            document_to_word_freqs: BTreeMap::new(),
            documents: BTreeMap::new(),
        }
    }

    /// Add a document to the index.
    ///
    /// Validation runs to completion before any mutation, so a failed call
    /// leaves the engine untouched: the id must be non-negative and unused,
    /// and every word of `text` must be free of control characters. Each
    /// non-stop occurrence contributes `1 / word_count` of term frequency.
    pub fn add_document(
        &mut self,
        document_id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<(), SearchError> {
        if document_id < 0 {
            return Err(SearchError::NegativeDocumentId(document_id));
        }
        if self.documents.contains_key(&document_id) {
            return Err(SearchError::DuplicateDocumentId(document_id));
        }
        let all_words = split_into_words(text);
        if let Some(bad) = all_words.iter().find(|word| !is_valid_word(word)) {
            return Err(SearchError::InvalidWord((*bad).to_string()));
        }

        let words: Vec<&str> = all_words
            .into_iter()
            .filter(|word| !self.stop_words.contains(word))
            .collect();
        if !words.is_empty() {
            let step = 1.0 / words.len() as f64;
            let frequencies = self.document_to_word_freqs.entry(document_id).or_default();
            for word in &words {
                *frequencies.entry(Box::from(*word)).or_insert(0.0) += step;
                *self
                    .word_to_document_freqs
                    .entry(Box::from(*word))
                    .or_default()
                    .entry(document_id)
                    .or_insert(0.0) += step;
            }
        }
        self.documents.insert(
            document_id,
            DocumentData {
                rating: average_rating(ratings),
                status,
            },
        );
        debug!(document_id, words = words.len(), "indexed document");
        Ok(())
    }

    /// Remove a document and every trace of it from both indexes.
    /// No-op when the id is absent.
    pub fn remove_document(&mut self, document_id: DocumentId) {
        self.remove_document_with(ExecutionPolicy::Sequential, document_id);
    }

    /// Like [`remove_document`](Self::remove_document), with an explicit
    /// execution policy. The parallel branch fans the per-word erasures out
    /// across worker tasks and finishes with sequential store cleanup;
    /// callers must serialize it against concurrent lookups of the same id.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocumentId) {
        match policy {
            ExecutionPolicy::Sequential => self.remove_document_seq(document_id),
            ExecutionPolicy::Parallel => self.remove_document_par(document_id),
        }
    }

    fn remove_document_seq(&mut self, document_id: DocumentId) {
        let Some(word_freqs) = self.document_to_word_freqs.remove(&document_id) else {
            return;
        };
        for word in word_freqs.keys() {
            let emptied = match self.word_to_document_freqs.get_mut(&**word) {
                Some(bucket) => {
                    bucket.remove(&document_id);
                    bucket.is_empty()
                }
                None => false,
            };
            if emptied {
                self.word_to_document_freqs.swap_remove(&**word);
            }
        }
        self.documents.remove(&document_id);
        debug!(document_id, "removed document");
    }

    /// Term frequencies of one document; an empty mapping when the id is
    /// absent (not an error).
    pub fn word_frequencies(&self, document_id: DocumentId) -> &BTreeMap<Box<str>, f64> {
        static EMPTY: BTreeMap<Box<str>, f64> = BTreeMap::new();
        self.document_to_word_freqs
            .get(&document_id)
            .unwrap_or(&EMPTY)
    }

    /// Number of live documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids, ascending. Restartable: each call starts a fresh
    /// iteration.
    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    /// Top documents for `raw_query` among those with status
    /// [`DocumentStatus::Actual`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>, SearchError> {
        self.find_top_documents_with_status(raw_query, DocumentStatus::Actual)
    }

    /// Top documents among those whose status equals `status`.
    pub fn find_top_documents_with_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, SearchError> {
        self.find_top_documents_filtered(
            ExecutionPolicy::Sequential,
            raw_query,
            move |_id, document_status, _rating| document_status == status,
        )
    }

    /// The general ranked search: candidates are documents containing at
    /// least one plus-word and accepted by `predicate`; documents matching
    /// any minus-word are excluded unconditionally. Results are sorted by
    /// relevance descending (rating descending within
    /// [`RELEVANCE_EPSILON`]) and truncated to
    /// [`MAX_RESULT_DOCUMENT_COUNT`]. The sequential and parallel branches
    /// return the same content.
    pub fn find_top_documents_filtered<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>, SearchError>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = Query::parse(&self.stop_words, raw_query)?;
        let mut matched = match policy {
            ExecutionPolicy::Sequential => self.find_all_documents(&query, &predicate),
            ExecutionPolicy::Parallel => self.find_all_documents_par(&query, &predicate),
        };
        Self::sort_and_truncate(&mut matched);
        trace!(
            query = raw_query,
            results = matched.len(),
            "ranked search finished"
        );
        Ok(matched)
    }

    /// Which plus-words of `raw_query` the document contains, with its
    /// status. Any matching minus-word empties the word list. The returned
    /// words are sorted and free of duplicates.
    pub fn match_document(
        &self,
        raw_query: &str,
        document_id: DocumentId,
    ) -> Result<(Vec<String>, DocumentStatus), SearchError> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    /// Like [`match_document`](Self::match_document), with an explicit
    /// execution policy.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        document_id: DocumentId,
    ) -> Result<(Vec<String>, DocumentStatus), SearchError> {
        // Syntax errors take precedence over the id check.
        let query = Query::parse(&self.stop_words, raw_query)?;
        let status = self
            .documents
            .get(&document_id)
            .ok_or(SearchError::DocumentNotFound(document_id))?
            .status;
        let words = match policy {
            ExecutionPolicy::Sequential => self.match_words(&query, document_id),
            ExecutionPolicy::Parallel => self.match_words_par(&query, document_id),
        };
        Ok((words, status))
    }

    fn match_words(&self, query: &Query, document_id: DocumentId) -> Vec<String> {
        for word in &query.minus_words {
            if self.word_contains(word, document_id) {
                return Vec::new();
            }
        }
        query
            .plus_words
            .iter()
            .filter(|word| self.word_contains(word.as_str(), document_id))
            .cloned()
            .collect()
    }

    fn find_all_documents<P>(&self, query: &Query, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool,
    {
        let mut document_to_relevance: BTreeMap<DocumentId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(bucket) = self.word_to_document_freqs.get(word.as_str()) else {
                continue;
            };
            let idf = self.inverse_document_freq(word);
            for (&document_id, &term_freq) in bucket {
                let Some(data) = self.documents.get(&document_id) else {
                    continue;
                };
                if predicate(document_id, data.status, data.rating) {
                    *document_to_relevance.entry(document_id).or_insert(0.0) += term_freq * idf;
                }
            }
        }
        // Minus-word exclusion is unconditional: it ignores the predicate
        // and always wins over plus-word accumulation.
        for word in &query.minus_words {
            let Some(bucket) = self.word_to_document_freqs.get(word.as_str()) else {
                continue;
            };
            for document_id in bucket.keys() {
                document_to_relevance.remove(document_id);
            }
        }

        self.collect_matches(document_to_relevance)
    }

    fn collect_matches(
        &self,
        document_to_relevance: BTreeMap<DocumentId, f64>,
    ) -> Vec<Document> {
        document_to_relevance
            .into_iter()
            .filter_map(|(document_id, relevance)| {
                self.documents
                    .get(&document_id)
                    .map(|data| Document::new(document_id, relevance, data.rating))
            })
            .collect()
    }

    fn sort_and_truncate(matched: &mut Vec<Document>) {
        matched.sort_by(|lhs, rhs| {
            if (lhs.relevance - rhs.relevance).abs() < RELEVANCE_EPSILON {
                rhs.rating.cmp(&lhs.rating)
            } else {
                rhs.relevance.total_cmp(&lhs.relevance)
            }
        });
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
    }

    /// `ln(live documents / documents containing the word)`.
    ///
    /// Precondition: the word is present in the forward index. Query paths
    /// check presence before calling; violating the precondition is a
    /// programming error, not a user-facing one.
    fn inverse_document_freq(&self, word: &str) -> f64 {
        let containing = match self.word_to_document_freqs.get(word) {
            Some(bucket) => bucket.len(),
            None => unreachable!("idf requested for a word absent from the index: {word}"),
        };
        (self.documents.len() as f64 / containing as f64).ln()
    }

    fn word_contains(&self, word: &str, document_id: DocumentId) -> bool {
        self.word_to_document_freqs
            .get(word)
            .is_some_and(|bucket| bucket.contains_key(&document_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_with_two_docs() -> SearchServer {
        let mut server = SearchServer::from_stop_words_text("и в на").unwrap();
        server
            .add_document(
                1,
                "пушистый кот пушистый хвост",
                DocumentStatus::Actual,
                &[7, 2, 7],
            )
            .unwrap();
        server
            .add_document(
                2,
                "пушистый пёс и модный ошейник",
                DocumentStatus::Actual,
                &[1, 2],
            )
            .unwrap();
        server
    }

    #[test]
    fn term_frequencies_of_a_document_sum_to_one() {
        let server = server_with_two_docs();
        for document_id in [1, 2] {
            let sum: f64 = server.word_frequencies(document_id).values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "doc {document_id}: sum = {sum}");
        }
    }

    #[test]
    fn repeated_words_accumulate_term_frequency() {
        let server = server_with_two_docs();
        let frequencies = server.word_frequencies(1);
        // "пушистый" appears twice among four words
        assert!((frequencies["пушистый"] - 0.5).abs() < 1e-9);
        assert!((frequencies["кот"] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn stop_words_never_reach_the_index() {
        let server = server_with_two_docs();
        assert!(!server.word_frequencies(2).contains_key("и"));
        assert!(server.find_top_documents("и").unwrap().is_empty());
    }

    #[test]
    fn document_made_of_stop_words_is_stored_but_not_indexed() {
        let mut server = SearchServer::from_stop_words_text("и в на").unwrap();
        server
            .add_document(8, "и в на", DocumentStatus::Actual, &[])
            .unwrap();
        assert_eq!(server.document_count(), 1);
        assert!(server.word_frequencies(8).is_empty());
    }

    #[test]
    fn add_document_rejects_negative_and_duplicate_ids_without_mutation() {
        let mut server = server_with_two_docs();
        assert_eq!(
            server.add_document(-1, "пёс", DocumentStatus::Actual, &[]),
            Err(SearchError::NegativeDocumentId(-1))
        );
        assert_eq!(
            server.add_document(1, "пёс", DocumentStatus::Actual, &[]),
            Err(SearchError::DuplicateDocumentId(1))
        );
        assert_eq!(server.document_count(), 2);
    }

    #[test]
    fn add_document_rejects_control_characters_without_mutation() {
        let mut server = server_with_two_docs();
        assert_eq!(
            server.add_document(3, "большой скво\x12рец", DocumentStatus::Actual, &[]),
            Err(SearchError::InvalidWord("скво\x12рец".to_string()))
        );
        assert_eq!(server.document_count(), 2);
        assert!(server.word_frequencies(3).is_empty());
    }

    #[test]
    fn removal_purges_every_trace_of_the_document() {
        let mut server = server_with_two_docs();
        server.remove_document(1);
        assert_eq!(server.document_count(), 1);
        assert!(server.word_frequencies(1).is_empty());
        for (word, bucket) in &server.word_to_document_freqs {
            assert!(
                !bucket.contains_key(&1),
                "forward bucket {word:?} still references the removed id"
            );
        }
        // "кот" and "хвост" only occurred in document 1; their buckets must
        // be gone entirely.
        assert!(server.word_to_document_freqs.get("кот").is_none());
        assert!(server.word_to_document_freqs.get("хвост").is_none());
        // shared word survives for document 2
        assert!(server.word_to_document_freqs.get("пушистый").is_some());
    }

    #[test]
    fn removal_is_idempotent() {
        let mut server = server_with_two_docs();
        server.remove_document(1);
        server.remove_document(1);
        server.remove_document(99);
        assert_eq!(server.document_count(), 1);
    }

    #[test]
    fn document_ids_iterate_ascending_and_restartable() {
        let mut server = server_with_two_docs();
        server
            .add_document(0, "большой пёс", DocumentStatus::Banned, &[1])
            .unwrap();
        let first: Vec<DocumentId> = server.document_ids().collect();
        let second: Vec<DocumentId> = server.document_ids().collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn match_document_reports_status_for_unknown_query_words() {
        let server = server_with_two_docs();
        let (words, status) = server.match_document("неизвестный", 1).unwrap();
        assert!(words.is_empty());
        assert_eq!(status, DocumentStatus::Actual);
    }

    #[test]
    fn match_document_fails_for_unknown_id() {
        let server = server_with_two_docs();
        assert_eq!(
            server.match_document("пушистый", 42),
            Err(SearchError::DocumentNotFound(42))
        );
    }
}
