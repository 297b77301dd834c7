//! Embedding providers
//!
//! An [`Embedder`] turns text into a fixed-length vector. The hosted
//! implementation lives in [`openai`]; tests plug in deterministic stubs.

pub mod openai;

use async_trait::async_trait;

use crate::errors::Result;

pub use openai::OpenAIEmbedder;

/// Generates embedding vectors from text
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, one vector per input in input order.
    ///
    /// The default calls [`embed`](Embedder::embed) sequentially.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Length of every vector this embedder produces
    fn dimensions(&self) -> usize;

    /// Model identifier recorded in the index manifest
    fn model_name(&self) -> &str;
}
