//! Batch query processing: fan a list of queries out across rayon worker
//! tasks and join the per-query result lists in order.

use rayon::prelude::*;

use crate::document::Document;
use crate::engine::SearchServer;
use crate::error::SearchError;

/// Evaluate every query in parallel, preserving order: `result[i]` holds
/// the top documents for `queries[i]`. The first malformed query fails the
/// whole batch.
pub fn process_queries(
    server: &SearchServer,
    queries: &[String],
) -> Result<Vec<Vec<Document>>, SearchError> {
    queries
        .par_iter()
        .map(|raw_query| server.find_top_documents(raw_query))
        .collect()
}

/// Like [`process_queries`], flattened: all per-query results concatenated
/// in query order. Capacity for the output is reserved up front from a
/// parallel reduction over the per-query match counts.
pub fn process_queries_joined(
    server: &SearchServer,
    queries: &[String],
) -> Result<Vec<Document>, SearchError> {
    let responses = process_queries(server, queries)?;
    let total: usize = responses.par_iter().map(|response| response.len()).sum();
    let mut joined = Vec::with_capacity(total);
    for response in responses {
        joined.extend(response);
    }
    Ok(joined)
}
