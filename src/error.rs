use thiserror::Error;

use crate::document::DocumentId;

/// Errors surfaced by the search engine.
///
/// Every variant of the `InvalidArgument` family is detected before any
/// state is mutated, so a failed call leaves the engine exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Document ids are non-negative.
    #[error("document id {0} is negative")]
    NegativeDocumentId(DocumentId),

    /// The caller attempted to add an already-present document id.
    #[error("document id {0} already exists")]
    DuplicateDocumentId(DocumentId),

    /// A word in a document, query, or stop-word set contains a control
    /// character (code point below U+0020).
    #[error("word contains a control character: {0:?}")]
    InvalidWord(String),

    /// A query contained a bare `-` token with no word after the minus.
    #[error("no text after the minus sign in query")]
    EmptyMinusWord,

    /// A query word started with more than one minus sign.
    #[error("more than one minus sign before query word {0:?}")]
    DoubleMinus(String),

    /// The requested document id is not in the index.
    #[error("document id {0} not found")]
    DocumentNotFound(DocumentId),
}
