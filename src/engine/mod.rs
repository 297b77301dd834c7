//! Question answering: retrieve passages, then synthesize an answer
//!
//! A [`QueryEngine`] is built once per process around a loaded index and
//! passed by reference to whatever handles queries. Each
//! [`answer`](QueryEngine::answer) call runs its own state machine from
//! `Idle` and leaves nothing behind for the next call.

pub mod state;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, Credential};
use crate::errors::{RagError, Result};
use crate::index::{RetrievedPassage, VectorIndex};
use crate::provider::ProviderFactory;
use crate::retrieval::Retriever;
use crate::synthesis::AnswerSynthesizer;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};

pub use state::{QueryEvent, QueryState};

/// Result of one question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnsweredQuery {
    pub query: String,
    pub answer: String,
    /// Passages used as context, nearest first
    pub passages: Vec<RetrievedPassage>,
}

impl AnsweredQuery {
    /// False when the model produced no answer text
    pub fn has_confident_answer(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// Tracks one query through the state machine
struct QueryRun {
    state: QueryState,
}

impl QueryRun {
    fn new() -> Self {
        Self {
            state: QueryState::Idle,
        }
    }

    fn advance(&mut self, event: QueryEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        debug!(from = ?self.state, to = ?next, "query state");
        self.state = next;
        Ok(())
    }

    /// Move to Failed and hand the error back
    fn fail(&mut self, err: RagError) -> RagError {
        if !self.state.is_terminal() {
            if let Ok(next) = self.state.transition(QueryEvent::Fail) {
                self.state = next;
            }
        }
        err
    }
}

/// Orchestrates retrieval and synthesis
pub struct QueryEngine {
    retriever: Retriever,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    telemetry: Option<TelemetryCollector>,
}

impl QueryEngine {
    pub fn new(retriever: Retriever, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        Self {
            retriever,
            synthesizer,
            telemetry: None,
        }
    }

    /// Load the index named in `config` and wire up the providers.
    ///
    /// The credential is checked before anything else, then the index
    /// location, then that the configured embedder produces vectors the
    /// index can search. No network call happens here.
    pub fn open(
        config: &Config,
        credential: Result<Credential>,
        factory: &dyn ProviderFactory,
    ) -> Result<Self> {
        let credential = credential?;
        let index = VectorIndex::load(&config.index.index_dir)?;

        info!(
            location = %config.index.index_dir.display(),
            entries = index.len(),
            model = %index.manifest().model,
            "index ready"
        );
        if index.manifest().model != config.provider.embedding_model {
            warn!(
                index_model = %index.manifest().model,
                configured_model = %config.provider.embedding_model,
                "index was built with a different embedding model"
            );
        }

        let embedder = factory.embedder(&credential)?;
        if embedder.dimensions() != index.dimensions() {
            return Err(RagError::index_not_found(
                config.index.index_dir.clone(),
                format!(
                    "index has {}-dimensional vectors but {} produces {}; rebuild it",
                    index.dimensions(),
                    embedder.model_name(),
                    embedder.dimensions()
                ),
            ));
        }
        let synthesizer = factory.synthesizer(&credential)?;
        let retriever =
            Retriever::new(Arc::new(index), embedder).with_top_k(config.index.top_k)?;

        Ok(Self::new(retriever, synthesizer))
    }

    /// Attach a telemetry collector
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    fn record(&self, event: TelemetryEvent) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record(event);
        }
    }

    /// Answer one question
    ///
    /// Blank input is rejected up front and not counted in telemetry.
    pub async fn answer(&self, query: &str) -> Result<AnsweredQuery> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }

        let mut run = QueryRun::new();

        let result = self.run(&mut run, query).await;
        if let Err(err) = &result {
            warn!(category = err.category(), error = %err, "query failed");
            self.record(TelemetryEvent::QueryFailed {
                category: err.category(),
                timestamp: Instant::now(),
            });
        }
        result
    }

    async fn run(&self, run: &mut QueryRun, query: &str) -> Result<AnsweredQuery> {
        self.record(TelemetryEvent::QueryStarted {
            query: query.to_string(),
            timestamp: Instant::now(),
        });

        run.advance(QueryEvent::StartRetrieval)?;
        let started = Instant::now();
        let passages = match self.retriever.search(query).await {
            Ok(passages) => passages,
            Err(err) => return Err(run.fail(err)),
        };
        self.record(TelemetryEvent::RetrievalCompleted {
            passages: passages.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Instant::now(),
        });

        run.advance(QueryEvent::PassagesRetrieved)?;
        let started = Instant::now();
        let synthesis = match self.synthesizer.synthesize(query, passages).await {
            Ok(synthesis) => synthesis,
            Err(err) => return Err(run.fail(err)),
        };

        let answered = AnsweredQuery {
            query: query.to_string(),
            answer: synthesis.answer.trim().to_string(),
            passages: synthesis.passages,
        };
        self.record(TelemetryEvent::SynthesisCompleted {
            answered: answered.has_confident_answer(),
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Instant::now(),
        });

        run.advance(QueryEvent::AnswerReady)?;
        info!(
            passages = answered.passages.len(),
            answered = answered.has_confident_answer(),
            "query complete"
        );
        Ok(answered)
    }
}
