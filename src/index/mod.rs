//! In-memory vector index with exact nearest-neighbour search
//!
//! The index is an ordered list of (document, embedding) entries. It is
//! assembled once by [`VectorIndex::build`], written once by
//! [`VectorIndex::persist`], and loaded back read-only. There is no
//! incremental update path: a changed corpus means a full rebuild.
//!
//! Search is a flat scan by squared Euclidean distance, nearest first,
//! with ties resolved by insertion order.

pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::Document;
use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::provider::PROVIDER;

pub use store::{INDEX_FILE, FORMAT_VERSION};

/// One indexed document and its embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Describes how and when an index was built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexManifest {
    pub format_version: u32,
    pub index_id: Uuid,
    pub model: String,
    pub dimensions: usize,
    pub built_at: DateTime<Utc>,
}

/// A search hit: the document and its position in the result list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedPassage {
    pub document: Document,
    /// 1-based, nearest first
    pub rank: usize,
    /// Squared Euclidean distance to the query vector
    pub distance: f32,
}

/// Read-only similarity index
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed every document and assemble the index.
    ///
    /// Entries keep document order, one embedding per document.
    pub async fn build(documents: Vec<Document>, embedder: &dyn Embedder) -> Result<Self> {
        if documents.is_empty() {
            return Err(RagError::EmptyCorpus(
                "cannot build an index from zero documents".to_string(),
            ));
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(RagError::service(
                PROVIDER,
                format!(
                    "embedder returned {} vectors for {} documents",
                    embeddings.len(),
                    documents.len()
                ),
            ));
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(RagError::service(
                PROVIDER,
                "embedder returned vectors of inconsistent or zero length",
            ));
        }

        let entries: Vec<IndexEntry> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexEntry { document, embedding })
            .collect();

        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            index_id: Uuid::new_v4(),
            model: embedder.model_name().to_string(),
            dimensions,
            built_at: Utc::now(),
        };

        info!(
            index_id = %manifest.index_id,
            entries = entries.len(),
            dimensions,
            "built vector index"
        );
        Ok(Self { manifest, entries })
    }

    /// Assemble an index from parts, checking entry invariants
    pub(crate) fn from_parts(manifest: IndexManifest, entries: Vec<IndexEntry>) -> std::result::Result<Self, String> {
        if entries.is_empty() {
            return Err("index contains no entries".to_string());
        }
        if manifest.dimensions == 0 {
            return Err("index dimensions must be positive".to_string());
        }
        if let Some(bad) = entries
            .iter()
            .find(|e| e.embedding.len() != manifest.dimensions)
        {
            return Err(format!(
                "entry {} has {} dimensions, expected {}",
                bad.document.id,
                bad.embedding.len(),
                manifest.dimensions
            ));
        }
        Ok(Self { manifest, entries })
    }

    /// Return the `k` nearest entries to `query`, nearest first.
    ///
    /// Returns `min(k, len)` passages. `k` must be positive and the query
    /// must match the index dimensionality.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>> {
        if k == 0 {
            return Err(RagError::InvalidArgument(
                "k must be a positive integer".to_string(),
            ));
        }
        if query.len() != self.manifest.dimensions {
            return Err(RagError::InvalidArgument(format!(
                "query vector has {} dimensions, index has {}",
                query.len(),
                self.manifest.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, squared_l2(&entry.embedding, query)))
            .collect();

        // Stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        debug!(k, hits = scored.len(), "index search");

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(position, (i, distance))| RetrievedPassage {
                document: self.entries[i].document.clone(),
                rank: position + 1,
                distance,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.manifest.dimensions
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
