use crate::freshness::UpdateTimestamp;
use crate::hashing::fingerprint_entries;

use super::entry::CorpusEntry;
use super::error::{CorpusError, CorpusResult};

/// A corpus entry paired with its precomputed embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub entry: CorpusEntry,
    pub vector: Vec<f32>,
}

/// Immutable, point-in-time copy of the corpus and its embeddings.
///
/// Every vector has the same dimension. Snapshots are replaced wholesale and
/// never mutated after [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    entries: Vec<IndexedEntry>,
    loaded_at: Option<UpdateTimestamp>,
    generation: u64,
    fingerprint: [u8; 32],
    dimension: usize,
}

impl CorpusSnapshot {
    /// The state before any corpus has been loaded (generation 0).
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            loaded_at: None,
            generation: 0,
            fingerprint: fingerprint_entries(std::iter::empty::<&CorpusEntry>()),
            dimension: 0,
        }
    }

    /// Pairs `entries[i]` with `vectors[i]`.
    pub fn build(
        entries: Vec<CorpusEntry>,
        vectors: Vec<Vec<f32>>,
        loaded_at: Option<UpdateTimestamp>,
        generation: u64,
    ) -> CorpusResult<Self> {
        if entries.len() != vectors.len() {
            return Err(CorpusError::Inconsistent {
                reason: format!(
                    "{} entries but {} vectors",
                    entries.len(),
                    vectors.len()
                ),
            });
        }

        let dimension = vectors.first().map_or(0, Vec::len);
        if let Some(index) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(CorpusError::Inconsistent {
                reason: format!(
                    "vector {} has dimension {}, expected {}",
                    index,
                    vectors[index].len(),
                    dimension
                ),
            });
        }

        let fingerprint = fingerprint_entries(&entries);
        let entries = entries
            .into_iter()
            .zip(vectors)
            .map(|(entry, vector)| IndexedEntry { entry, vector })
            .collect();

        Ok(Self {
            entries,
            loaded_at,
            generation,
            fingerprint,
            dimension,
        })
    }

    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freshness timestamp observed when this snapshot was loaded.
    pub fn loaded_at(&self) -> Option<UpdateTimestamp> {
        self.loaded_at
    }

    /// Monotonic install counter; 0 means nothing was ever loaded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` once a load has been installed.
    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    /// BLAKE3 digest over the ordered entries.
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for CorpusSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
