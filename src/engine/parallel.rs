//! Parallel branches of the engine operations.
//!
//! The model is fork/join over rayon's pool: worker tasks partition the
//! query words (or forward-index buckets) and join before any result is
//! observed. Relevance accumulation goes through a per-call
//! [`ConcurrentMap`]; it never outlives the operation that created it.

use rayon::prelude::*;
use tracing::debug;

use crate::concurrent_map::ConcurrentMap;
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::query::Query;

use super::SearchServer;

/// Shards of the per-call relevance accumulator. Enough to keep worker
/// tasks off each other's locks without bloating the final merge.
const RELEVANCE_SHARD_COUNT: usize = 16;

/// Execution strategy for the operations that have a parallel variant.
///
/// Both branches of every operation return the same content; they differ
/// only in performance and internal ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

impl SearchServer {
    pub(super) fn find_all_documents_par<P>(&self, query: &Query, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let accumulator: ConcurrentMap<DocumentId, f64> =
            ConcurrentMap::new(RELEVANCE_SHARD_COUNT);

        query.plus_words.par_iter().for_each(|word| {
            let Some(bucket) = self.word_to_document_freqs.get(word.as_str()) else {
                return;
            };
            let idf = self.inverse_document_freq(word);
            for (&document_id, &term_freq) in bucket {
                let Some(data) = self.documents.get(&document_id) else {
                    continue;
                };
                if predicate(document_id, data.status, data.rating) {
                    accumulator.with_lock(document_id, |relevance| {
                        *relevance += term_freq * idf;
                    });
                }
            }
        });

        query.minus_words.par_iter().for_each(|word| {
            let Some(bucket) = self.word_to_document_freqs.get(word.as_str()) else {
                return;
            };
            for &document_id in bucket.keys() {
                accumulator.erase(document_id);
            }
        });

        // All workers have joined; merge the shards into an ordinary map
        // before ranking.
        self.collect_matches(accumulator.into_snapshot())
    }

    /// Two-phase removal: the per-word forward-bucket erasures run in
    /// parallel (each touches a distinct bucket), then document-store and
    /// reverse-index cleanup happen sequentially after the join.
    pub(super) fn remove_document_par(&mut self, document_id: DocumentId) {
        let Some(word_freqs) = self.document_to_word_freqs.remove(&document_id) else {
            return;
        };
        self.word_to_document_freqs
            .par_iter_mut()
            .for_each(|(word, bucket)| {
                if word_freqs.contains_key(&**word) {
                    bucket.remove(&document_id);
                }
            });
        self.word_to_document_freqs
            .retain(|_, bucket| !bucket.is_empty());
        self.documents.remove(&document_id);
        debug!(document_id, "removed document");
    }

    pub(super) fn match_words_par(&self, query: &Query, document_id: DocumentId) -> Vec<String> {
        let excluded = query
            .minus_words
            .par_iter()
            .any(|word| self.word_contains(word, document_id));
        if excluded {
            return Vec::new();
        }
        let mut matched: Vec<String> = query
            .plus_words
            .par_iter()
            .filter(|word| self.word_contains(word.as_str(), document_id))
            .cloned()
            .collect();
        // Sort + dedup so the list is duplicate-free whatever order the
        // worker tasks produced.
        matched.sort_unstable();
        matched.dedup();
        matched
    }
}
