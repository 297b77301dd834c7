//! Query engine state machine
//!
//! Valid transitions:
//! 1. Idle         → Retrieving   (on: StartRetrieval)
//! 2. Retrieving   → Synthesizing (on: PassagesRetrieved)
//! 3. Synthesizing → Done         (on: AnswerReady)
//! 4. Idle | Retrieving | Synthesizing → Failed (on: Fail)
//!
//! Done and Failed are terminal. Every `answer` call starts a fresh machine
//! at Idle.

use crate::errors::{RagError, Result};
use serde::{Deserialize, Serialize};

/// Per-query states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryState {
    Idle,
    Retrieving,
    Synthesizing,
    Done,
    Failed,
}

/// Events driving a query through the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryEvent {
    StartRetrieval,
    PassagesRetrieved,
    AnswerReady,
    Fail,
}

impl QueryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryState::Done | QueryState::Failed)
    }

    /// Apply `event`, rejecting anything not listed in the module docs
    pub fn transition(&self, event: QueryEvent) -> Result<QueryState> {
        use QueryEvent::*;
        use QueryState::*;

        let next = match (self, event) {
            (Idle, StartRetrieval) => Retrieving,
            (Retrieving, PassagesRetrieved) => Synthesizing,
            (Synthesizing, AnswerReady) => Done,
            (Idle | Retrieving | Synthesizing, Fail) => Failed,
            (from, event) => {
                return Err(RagError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }
}
