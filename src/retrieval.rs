//! Query-time retrieval: embed the question, search the index

use std::sync::Arc;
use tracing::debug;

use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::index::{RetrievedPassage, VectorIndex};

/// Default number of passages handed to the synthesizer
pub const DEFAULT_TOP_K: usize = 4;

/// Wraps a shared, read-only index with a fixed top-k policy
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever with [`DEFAULT_TOP_K`]
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override `top_k`; zero is rejected
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(RagError::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }
        self.top_k = top_k;
        Ok(self)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Passages nearest to `query`, nearest first
    pub async fn search(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        let query_vector = self.embedder.embed(query).await?;
        let passages = self.index.search(&query_vector, self.top_k)?;
        debug!(top_k = self.top_k, hits = passages.len(), "retrieved passages");
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use async_trait::async_trait;

    /// Embeds by counting a few keywords
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(["open", "vegan", "parking"]
                .iter()
                .map(|k| lower.matches(k).count() as f32)
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    async fn retriever() -> Retriever {
        let docs = vec![
            Document::new("parking", "Free parking behind the building."),
            Document::new("hours", "We open at 9am."),
            Document::new("menu", "Vegan options on every vegan night."),
        ];
        let index = VectorIndex::build(docs, &KeywordEmbedder).await.unwrap();
        Retriever::new(Arc::new(index), Arc::new(KeywordEmbedder))
    }

    #[tokio::test]
    async fn test_default_top_k() {
        let retriever = retriever().await;
        assert_eq!(retriever.top_k(), DEFAULT_TOP_K);
        // Index is smaller than k
        assert_eq!(retriever.search("when do you open").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_ranks_relevant_first() {
        let retriever = retriever().await.with_top_k(1).unwrap();
        let hits = retriever.search("Is there parking?").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, "parking");
    }

    #[tokio::test]
    async fn test_zero_top_k_rejected() {
        assert!(retriever().await.with_top_k(0).is_err());
    }
}
