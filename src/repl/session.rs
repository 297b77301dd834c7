//! Session history for the interactive loop
//!
//! Keeps a bounded record of asked questions for `/history`. Nothing here
//! feeds back into answering; every query is independent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of questions to keep in history
const MAX_HISTORY_SIZE: usize = 1000;

/// How a question ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOutcome {
    Answered,
    NotFound,
    Failed { category: String },
}

/// Record of one asked question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    pub outcome: QueryOutcome,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl QueryRecord {
    pub fn new(query: impl Into<String>, outcome: QueryOutcome, duration_ms: u64) -> Self {
        Self {
            query: query.into(),
            outcome,
            duration_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Session manager maintaining REPL state
pub struct SessionManager {
    /// FIFO queue, bounded to MAX_HISTORY_SIZE
    history: VecDeque<QueryRecord>,
    query_count: usize,
    show_sources: bool,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager {
            history: VecDeque::new(),
            query_count: 0,
            show_sources: false,
        }
    }

    /// Record a finished question
    pub fn record(&mut self, record: QueryRecord) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(record);
        self.query_count += 1;
    }

    /// Up to `limit` records, newest first
    pub fn get_history(&self, limit: usize) -> Vec<&QueryRecord> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Total questions asked, including evicted ones
    pub fn query_count(&self) -> usize {
        self.query_count
    }

    pub fn show_sources(&self) -> bool {
        self.show_sources
    }

    pub fn set_show_sources(&mut self, enable: bool) {
        self.show_sources = enable;
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_initialization() {
        let session = SessionManager::new();
        assert_eq!(session.query_count(), 0);
        assert_eq!(session.history_len(), 0);
        assert!(!session.show_sources());
    }

    #[test]
    fn test_history_newest_first() {
        let mut session = SessionManager::new();
        session.record(QueryRecord::new("first", QueryOutcome::Answered, 10));
        session.record(QueryRecord::new("second", QueryOutcome::NotFound, 20));

        let history = session.get_history(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].query, "second");
        assert_eq!(history[1].outcome, QueryOutcome::Answered);
    }

    #[test]
    fn test_history_bounded() {
        let mut session = SessionManager::new();
        for i in 0..(MAX_HISTORY_SIZE + 5) {
            session.record(QueryRecord::new(format!("q{}", i), QueryOutcome::Answered, 1));
        }

        assert_eq!(session.history_len(), MAX_HISTORY_SIZE);
        assert_eq!(session.query_count(), MAX_HISTORY_SIZE + 5);
        assert_eq!(session.get_history(1)[0].query, format!("q{}", MAX_HISTORY_SIZE + 4));
    }
}
