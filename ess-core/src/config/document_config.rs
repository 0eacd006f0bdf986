use serde::{Deserialize, Serialize};

use super::defaults;

/// Document-lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Number of passages requested from the index.
    pub top_k: usize,
    /// Passages scoring below this are dropped.
    pub min_score: f32,
    /// Chunk size (characters) used when indexing policy text.
    pub chunk_size: usize,
    /// Overlap (characters) between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            min_score: defaults::DEFAULT_MIN_SCORE,
            chunk_size: defaults::DEFAULT_CHUNK_SIZE,
            chunk_overlap: defaults::DEFAULT_CHUNK_OVERLAP,
        }
    }
}
