//! Fixed text → vector table for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::Embedder;
use super::error::EmbeddingError;

/// Embedder that answers from a lookup table.
///
/// Unknown texts embed to the zero vector, or fail when the embedder is strict.
/// Clones share all state (table, strictness, call counter).
#[derive(Debug, Clone)]
pub struct LookupEmbedder {
    table: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    dim: usize,
    strict: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl LookupEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            table: Arc::new(RwLock::new(HashMap::new())),
            dim,
            strict: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(self, text: &str, vector: Vec<f32>) -> Self {
        self.insert(text, vector);
        self
    }

    pub fn insert(&self, text: &str, vector: Vec<f32>) {
        self.table.write().insert(text.to_string(), vector);
    }

    /// Makes unknown texts an inference failure instead of a zero vector.
    pub fn strict(self) -> Self {
        self.set_strict(true);
        self
    }

    pub fn set_strict(&self, strict: bool) {
        self.strict.store(strict, Ordering::SeqCst);
    }

    /// Number of `embed` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for LookupEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.table.read().get(text) {
            Some(vector) if vector.len() != self.dim => Err(EmbeddingError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            }),
            Some(vector) => Ok(vector.clone()),
            None if self.strict.load(Ordering::SeqCst) => Err(EmbeddingError::InferenceFailed {
                reason: format!("no vector registered for '{}'", text),
            }),
            None => Ok(vec![0.0; self.dim]),
        }
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn mode(&self) -> &'static str {
        "lookup"
    }
}
