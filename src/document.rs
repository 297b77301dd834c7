//! Source documents and the corpus loader

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{RagError, Result};

/// A unit of source text plus provenance metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Create a document with no metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Provenance path, when known
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(String::as_str)
    }
}

/// How a source file is divided into documents before embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// The whole file becomes one document
    #[default]
    WholeDocument,
    /// One document per blank-line separated paragraph
    Paragraphs,
}

/// Reads a text corpus from disk
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    policy: SplitPolicy,
}

impl DocumentLoader {
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    /// Load every document from `path`.
    ///
    /// Fails with `NotFound` when the path is not a regular file and with
    /// `EmptyCorpus` when no non-blank text remains.
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        if !path.is_file() {
            return Err(RagError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path)?;
        let source = path.display().to_string();
        let documents = self.split(&text, &source);

        if documents.is_empty() {
            return Err(RagError::EmptyCorpus(format!(
                "no documents loaded from {}",
                source
            )));
        }

        info!(
            source = %source,
            policy = ?self.policy,
            documents = documents.len(),
            "loaded corpus"
        );
        Ok(documents)
    }

    /// Apply the split policy to already-read text
    pub fn split(&self, text: &str, source: &str) -> Vec<Document> {
        match self.policy {
            SplitPolicy::WholeDocument => {
                if text.trim().is_empty() {
                    return Vec::new();
                }
                vec![Document::new(format!("{}#0", source), text).with_metadata("source", source)]
            }
            SplitPolicy::Paragraphs => {
                let mut documents = Vec::new();
                let mut current: Vec<&str> = Vec::new();

                for line in text.lines().chain(std::iter::once("")) {
                    if line.trim().is_empty() {
                        if !current.is_empty() {
                            let paragraph = current.join("\n");
                            let index = documents.len();
                            documents.push(
                                Document::new(format!("{}#{}", source, index), paragraph)
                                    .with_metadata("source", source)
                                    .with_metadata("paragraph", index.to_string()),
                            );
                            current.clear();
                        }
                    } else {
                        current.push(line);
                    }
                }

                debug!(source, paragraphs = documents.len(), "split corpus into paragraphs");
                documents
            }
        }
    }
}
