//! OpenAI embeddings client (`POST /embeddings`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::provider::{ProviderClient, PROVIDER};

/// Dimensionality of `text-embedding-3-small` and `text-embedding-ada-002`
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Native vector length for a model name
pub fn default_dimensions(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => DEFAULT_DIMENSIONS,
    }
}

/// [`Embedder`] backed by the OpenAI embeddings API
pub struct OpenAIEmbedder {
    client: ProviderClient,
    model: String,
    dimensions: usize,
    /// Sent to the API to shorten vectors; `text-embedding-3-*` only
    request_dimensions: Option<usize>,
}

impl OpenAIEmbedder {
    pub fn new(client: ProviderClient, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client,
            dimensions: default_dimensions(&model),
            model,
            request_dimensions: None,
        }
    }

    /// Ask the API for shortened vectors of this length
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self.request_dimensions = Some(dimensions);
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::service(PROVIDER, "API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(batch_size = texts.len(), model = %self.model, "embedding batch");

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        };
        let response: EmbeddingResponse = self.client.post_json("embeddings", &request).await?;
        let vectors = ordered_vectors(response.data, texts.len())?;

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(RagError::service(
                PROVIDER,
                format!(
                    "{} returned {}-dimensional vectors, expected {}",
                    self.model,
                    bad.len(),
                    self.dimensions
                ),
            ));
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Restore input order and check one vector per input
fn ordered_vectors(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(RagError::service(
            PROVIDER,
            format!("expected {} embeddings, got {}", expected, data.len()),
        ));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use std::time::Duration;

    #[test]
    fn test_response_reordered_by_index() {
        let json = r#"{"data":[
            {"index":1,"embedding":[0.0,1.0]},
            {"index":0,"embedding":[1.0,0.0]}
        ]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        let vectors = ordered_vectors(response.data, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch_is_service_error() {
        let err = ordered_vectors(Vec::new(), 1).unwrap_err();
        assert_eq!(err.category(), "ServiceError");
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &["hours?"],
            dimensions: None,
        })
        .unwrap();
        assert_eq!(body["model"], "text-embedding-3-small");
        assert_eq!(body["input"][0], "hours?");
        assert!(body.get("dimensions").is_none());

        let body = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &["hours?"],
            dimensions: Some(256),
        })
        .unwrap();
        assert_eq!(body["dimensions"], 256);
    }

    #[test]
    fn test_dimensions_follow_model() {
        assert_eq!(default_dimensions("text-embedding-3-large"), 3072);
        assert_eq!(default_dimensions("text-embedding-3-small"), DEFAULT_DIMENSIONS);
        assert_eq!(default_dimensions("text-embedding-ada-002"), DEFAULT_DIMENSIONS);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let client = ProviderClient::new(
            "http://127.0.0.1:9",
            Credential::new("sk-test").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        let embedder = OpenAIEmbedder::new(client, "text-embedding-3-small");
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
        assert_eq!(embedder.dimensions(), DEFAULT_DIMENSIONS);
    }
}
