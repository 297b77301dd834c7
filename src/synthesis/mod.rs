//! Answer synthesis from retrieved passages
//!
//! An [`AnswerSynthesizer`] turns a question plus supporting passages into
//! answer text. It must hand back exactly the passages it used as context
//! so callers can show provenance.

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::index::RetrievedPassage;

pub use openai::OpenAIChatSynthesizer;

/// Answer text and the passages it was generated from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Synthesis {
    pub answer: String,
    pub passages: Vec<RetrievedPassage>,
}

/// Produces an answer from a question and ordered context passages
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn synthesize(&self, query: &str, passages: Vec<RetrievedPassage>) -> Result<Synthesis>;
}
