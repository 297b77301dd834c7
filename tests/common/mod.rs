//! Shared stubs for integration tests. Nothing here touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aromabot::config::Credential;
use aromabot::embedding::Embedder;
use aromabot::index::RetrievedPassage;
use aromabot::provider::ProviderFactory;
use aromabot::synthesis::{AnswerSynthesizer, Synthesis};
use aromabot::Result;

/// Words the keyword embedder counts, one dimension each
const VOCABULARY: &[&str] = &[
    "open", "hours", "close", "menu", "vegan", "gluten", "catering", "parking",
];

/// Deterministic embedder: counts vocabulary hits, plus a constant bias
/// dimension so no vector is all zeros.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: Arc<AtomicUsize>,
}

impl KeywordEmbedder {
    pub fn counting(calls: Arc<AtomicUsize>) -> Self {
        Self { calls }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        // "9am"/"10pm" style times count towards "hours"
        if lower.contains("am ") || lower.contains("pm") {
            v[1] += 1.0;
        }
        v.push(1.0);
        v
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len() + 1
    }

    fn model_name(&self) -> &str {
        "keyword-stub"
    }
}

/// Embedder whose documents spell out their own vector, e.g. "1,2,-3"
pub struct LiteralEmbedder {
    pub dimensions: usize,
}

#[async_trait]
impl Embedder for LiteralEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(text
            .split(',')
            .map(|part| part.trim().parse::<f32>().unwrap_or(0.0))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "literal-stub"
    }
}

/// Returns a canned answer and passes the passages through
pub struct CannedSynthesizer {
    answer: String,
    calls: Arc<AtomicUsize>,
}

impl CannedSynthesizer {
    pub fn new(answer: impl Into<String>, calls: Arc<AtomicUsize>) -> Self {
        Self {
            answer: answer.into(),
            calls,
        }
    }
}

#[async_trait]
impl AnswerSynthesizer for CannedSynthesizer {
    async fn synthesize(&self, _query: &str, passages: Vec<RetrievedPassage>) -> Result<Synthesis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Synthesis {
            answer: self.answer.clone(),
            passages,
        })
    }
}

/// Factory whose embedder yields vectors of a different length than
/// [`KeywordEmbedder`], as if the embedding model changed after a build.
pub struct LiteralFactory {
    pub created: Arc<AtomicUsize>,
}

impl LiteralFactory {
    pub fn new() -> Self {
        Self {
            created: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ProviderFactory for LiteralFactory {
    fn embedder(&self, _credential: &Credential) -> Result<Arc<dyn Embedder>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(LiteralEmbedder { dimensions: 2 }))
    }

    fn synthesizer(&self, _credential: &Credential) -> Result<Arc<dyn AnswerSynthesizer>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CannedSynthesizer::new(
            "unused",
            Arc::new(AtomicUsize::new(0)),
        )))
    }
}

/// Factory that hands out stubs and counts every component it creates
/// and every call those components receive.
pub struct StubFactory {
    pub answer: String,
    pub created: Arc<AtomicUsize>,
    pub embed_calls: Arc<AtomicUsize>,
    pub synth_calls: Arc<AtomicUsize>,
}

impl StubFactory {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            created: Arc::new(AtomicUsize::new(0)),
            embed_calls: Arc::new(AtomicUsize::new(0)),
            synth_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Components created plus calls made against them
    pub fn external_calls(&self) -> usize {
        self.created.load(Ordering::SeqCst)
            + self.embed_calls.load(Ordering::SeqCst)
            + self.synth_calls.load(Ordering::SeqCst)
    }
}

impl ProviderFactory for StubFactory {
    fn embedder(&self, _credential: &Credential) -> Result<Arc<dyn Embedder>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(KeywordEmbedder::counting(self.embed_calls.clone())))
    }

    fn synthesizer(&self, _credential: &Credential) -> Result<Arc<dyn AnswerSynthesizer>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CannedSynthesizer::new(
            self.answer.clone(),
            self.synth_calls.clone(),
        )))
    }
}

pub fn test_credential() -> Result<Credential> {
    Credential::new("sk-test")
}

pub fn missing_credential() -> Result<Credential> {
    Credential::new("")
}
