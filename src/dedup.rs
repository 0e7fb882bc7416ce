//! Duplicate-document detection over the engine's introspection API.

use std::collections::BTreeSet;

use tracing::info;

use crate::document::DocumentId;
use crate::engine::SearchServer;

/// Remove every document whose word set duplicates that of an
/// earlier-added (lower-id) document. Ratings and frequencies are ignored;
/// only the set of indexed words matters. Returns the removed ids in
/// ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocumentId> {
    let duplicates = {
        let mut seen: BTreeSet<Vec<&str>> = BTreeSet::new();
        let mut duplicates = Vec::new();
        for document_id in server.document_ids().collect::<Vec<_>>() {
            let words: Vec<&str> = server
                .word_frequencies(document_id)
                .keys()
                .map(|word| &**word)
                .collect();
            if !seen.insert(words) {
                duplicates.push(document_id);
            }
        }
        duplicates
    };

    for &document_id in &duplicates {
        info!(document_id, "found duplicate document");
        server.remove_document(document_id);
    }
    duplicates
}
