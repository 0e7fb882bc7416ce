use serde::{Deserialize, Serialize};

/// Identifier of a document. Non-negative once accepted by the engine;
/// the signed representation lets the engine reject negative ids instead
/// of silently wrapping them.
pub type DocumentId = i32;

/// Caller-supplied document tag. The engine never interprets it except
/// through a caller-supplied predicate (or the default `Actual` filter).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

/// A single ranked search result.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    /// Sum over matched plus-words of `term_frequency * idf`. 0.0 when no
    /// plus-word matched.
    pub relevance: f64,
    /// Average rating copied from the stored document.
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocumentId, relevance: f64, rating: i32) -> Self {
        Document {
            id,
            relevance,
            rating,
        }
    }
}

/// Floor of the arithmetic mean of `ratings`, 0 when none were supplied.
pub(crate) fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i32 = ratings.iter().sum();
    sum.div_euclid(ratings.len() as i32)
}
