/// This crate is an in-memory document search engine built on a TF-IDF
/// inverted index.
pub mod concurrent_map;
pub mod dedup;
pub mod document;
pub mod engine;
pub mod error;
pub mod process_queries;
pub mod query;
pub mod request_queue;
pub mod stop_words;
pub mod tokenizer;

/// Search Server
/// The top-level struct of this crate, providing the main search-engine
/// features. It builds an inverted index from added documents, scores
/// queries with TF-IDF, and ranks and returns top results.
///
/// Internally, it holds:
/// - The stop-word set
/// - The forward index (word -> document id -> term frequency)
/// - The reverse index (document id -> word -> term frequency), kept so
///   removal costs O(document word count)
/// - The document store (average rating and status per id)
///
/// Mutation (`add_document`, `remove_document`) is single-writer;
/// read-only ranked queries may run concurrently and keep their working
/// state in a per-call [`ConcurrentMap`].
pub use engine::SearchServer;

/// Execution strategy argument for the operations that have a parallel
/// variant (`find_top_documents_filtered`, `match_document_with`,
/// `remove_document_with`). The sequential and parallel branches return
/// the same content, differing only in performance and internal ordering.
pub use engine::ExecutionPolicy;

pub use engine::{MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON};

/// A single ranked search result: document id, TF-IDF relevance, and the
/// document's average rating.
pub use document::Document;

pub use document::{DocumentId, DocumentStatus};

/// Error taxonomy of the crate. Every validation error is detected before
/// any state is mutated.
pub use error::SearchError;

/// A parsed query: plus-words that must match, minus-words that must not.
pub use query::Query;

pub use stop_words::StopWords;

/// Sharded lock-partitioned map for integer keys
/// Used by the parallel query paths as a per-call relevance accumulator;
/// exposed for callers that fan their own aggregation out across worker
/// tasks. Access is lock-guarded only; no raw map reference escapes.
pub use concurrent_map::ConcurrentMap;

/// Batch query processing
/// `process_queries` evaluates a list of queries in parallel,
/// order-preserving; `process_queries_joined` flattens the per-query
/// results in query order.
pub use process_queries::{process_queries, process_queries_joined};

/// Request statistics over a sliding day window, wrapping the find API.
pub use request_queue::RequestQueue;

/// Duplicate-document removal over the introspection API (`document_ids`
/// plus `word_frequencies`).
pub use dedup::remove_duplicates;
