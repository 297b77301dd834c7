//! Index build pipeline: load corpus, embed, persist

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::config::{Credential, IndexConfig};
use crate::document::DocumentLoader;
use crate::errors::Result;
use crate::index::VectorIndex;
use crate::provider::ProviderFactory;

/// What a successful build produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSummary {
    pub index_id: Uuid,
    pub documents: usize,
    pub dimensions: usize,
    pub location: PathBuf,
    pub duration_ms: u64,
}

/// Builds and persists an index from the configured corpus
pub struct Indexer {
    config: IndexConfig,
}

impl Indexer {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Run the full build.
    ///
    /// Preconditions are checked in order before any network call: the
    /// credential, then the source file, then a non-empty corpus.
    pub async fn build(
        &self,
        credential: Result<Credential>,
        factory: &dyn ProviderFactory,
    ) -> Result<BuildSummary> {
        let started = Instant::now();
        let credential = credential?;

        let loader = DocumentLoader::new(self.config.split);
        let documents = loader.load(&self.config.source_path)?;
        let document_count = documents.len();

        let embedder = factory.embedder(&credential)?;
        let index = VectorIndex::build(documents, embedder.as_ref()).await?;
        index.persist(&self.config.index_dir)?;

        let summary = BuildSummary {
            index_id: index.manifest().index_id,
            documents: document_count,
            dimensions: index.dimensions(),
            location: self.config.index_dir.clone(),
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            index_id = %summary.index_id,
            documents = summary.documents,
            location = %summary.location.display(),
            "index build complete"
        );
        Ok(summary)
    }
}
