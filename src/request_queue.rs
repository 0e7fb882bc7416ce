//! Request statistics over a sliding window.
//!
//! [`RequestQueue`] wraps the engine's find operations and keeps one day's
//! worth of query outcomes in a ring, counting the requests that produced
//! no results. Each wrapped call advances the clock by one minute.

use std::collections::VecDeque;

use crate::document::{Document, DocumentId, DocumentStatus};
use crate::engine::{ExecutionPolicy, SearchServer};
use crate::error::SearchError;

const MINUTES_IN_DAY: u64 = 1440;

struct QueryResult {
    timestamp: u64,
    results: usize,
}

/// Sliding-day analytics wrapper around a [`SearchServer`].
pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    requests: VecDeque<QueryResult>,
    no_result_requests: usize,
    current_time: u64,
}

impl<'a> RequestQueue<'a> {
    pub fn new(server: &'a SearchServer) -> Self {
        RequestQueue {
            server,
            requests: VecDeque::new(),
            no_result_requests: 0,
            current_time: 0,
        }
    }

    /// Run an `Actual`-status search and record its outcome.
    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>, SearchError> {
        let result = self.server.find_top_documents(raw_query)?;
        self.record(result.len());
        Ok(result)
    }

    /// Run a status-filtered search and record its outcome.
    pub fn add_find_request_with_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, SearchError> {
        let result = self.server.find_top_documents_with_status(raw_query, status)?;
        self.record(result.len());
        Ok(result)
    }

    /// Run a predicate-filtered search and record its outcome.
    pub fn add_find_request_by<P>(
        &mut self,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>, SearchError>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let result =
            self.server
                .find_top_documents_filtered(ExecutionPolicy::Sequential, raw_query, predicate)?;
        self.record(result.len());
        Ok(result)
    }

    /// How many requests in the last day returned nothing.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    fn record(&mut self, results: usize) {
        self.current_time += 1;
        while let Some(front) = self.requests.front() {
            if self.current_time - front.timestamp < MINUTES_IN_DAY {
                break;
            }
            if front.results == 0 {
                self.no_result_requests -= 1;
            }
            self.requests.pop_front();
        }
        self.requests.push_back(QueryResult {
            timestamp: self.current_time,
            results,
        });
        if results == 0 {
            self.no_result_requests += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_server() -> SearchServer {
        let mut server = SearchServer::from_stop_words_text("and in at").unwrap();
        let corpus = [
            (1, "curly cat curly tail", &[7, 2, 7][..]),
            (2, "curly dog and fancy collar", &[1, 2, 3]),
            (3, "big cat fancy collar", &[1, 2, 8]),
            (4, "big dog sparrow Eugene", &[1, 3, 2]),
            (5, "big dog sparrow Vasiliy", &[1, 1, 1]),
        ];
        for (id, text, ratings) in corpus {
            server
                .add_document(id, text, DocumentStatus::Actual, ratings)
                .unwrap();
        }
        server
    }

    #[test]
    fn old_empty_requests_expire_after_a_day() {
        let server = populated_server();
        let mut queue = RequestQueue::new(&server);

        for _ in 0..1439 {
            queue.add_find_request("empty request").unwrap();
        }
        assert_eq!(queue.no_result_requests(), 1439);

        // minute 1440: still within the first day
        queue.add_find_request("curly dog").unwrap();
        assert_eq!(queue.no_result_requests(), 1439);

        // each further minute pushes one old empty request out
        queue.add_find_request("big collar").unwrap();
        assert_eq!(queue.no_result_requests(), 1438);
        queue.add_find_request("sparrow").unwrap();
        assert_eq!(queue.no_result_requests(), 1437);
    }

    #[test]
    fn failed_requests_are_not_recorded() {
        let server = populated_server();
        let mut queue = RequestQueue::new(&server);
        assert!(queue.add_find_request("curly --dog").is_err());
        assert_eq!(queue.no_result_requests(), 0);
        queue.add_find_request("nothing here").unwrap();
        assert_eq!(queue.no_result_requests(), 1);
    }
}
