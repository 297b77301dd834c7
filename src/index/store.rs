//! On-disk persistence for [`VectorIndex`]
//!
//! Layout: a directory holding a single `index.json`. Writes go to a
//! temporary file in the same directory and are renamed into place, so a
//! reader sees either the old index or the new one. A crash mid-write
//! leaves undefined state; rebuild in that case.
//!
//! Loading deserializes whatever the directory contains. Only load from
//! locations you control.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{RagError, Result};
use crate::index::{IndexEntry, IndexManifest, VectorIndex};

/// File name inside the index directory
pub const INDEX_FILE: &str = "index.json";

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct IndexFileRef<'a> {
    manifest: &'a IndexManifest,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct IndexFile {
    manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Write the index to `location`, replacing any previous index there
    pub fn persist(&self, location: &Path) -> Result<()> {
        fs::create_dir_all(location)?;

        let json = serde_json::to_vec(&IndexFileRef {
            manifest: &self.manifest,
            entries: &self.entries,
        })?;

        let final_path = location.join(INDEX_FILE);
        let tmp_path = location.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &final_path)?;

        info!(
            location = %location.display(),
            entries = self.entries.len(),
            "persisted vector index"
        );
        Ok(())
    }

    /// Load an index previously written by [`persist`](VectorIndex::persist).
    ///
    /// Any missing, unreadable or invalid content is `IndexNotFound`.
    pub fn load(location: &Path) -> Result<Self> {
        if !location.is_dir() {
            return Err(RagError::index_not_found(location, "directory does not exist"));
        }

        let path = location.join(INDEX_FILE);
        let bytes = fs::read(&path).map_err(|e| {
            RagError::index_not_found(location, format!("cannot read {}: {}", INDEX_FILE, e))
        })?;

        let file: IndexFile = serde_json::from_slice(&bytes).map_err(|e| {
            RagError::index_not_found(location, format!("invalid index file: {}", e))
        })?;

        if file.manifest.format_version != FORMAT_VERSION {
            return Err(RagError::index_not_found(
                location,
                format!(
                    "unsupported format version {} (expected {})",
                    file.manifest.format_version, FORMAT_VERSION
                ),
            ));
        }

        let index = VectorIndex::from_parts(file.manifest, file.entries)
            .map_err(|reason| RagError::index_not_found(location, reason))?;

        debug!(
            location = %location.display(),
            index_id = %index.manifest.index_id,
            entries = index.len(),
            "loaded vector index"
        );
        Ok(index)
    }
}
