use std::path::PathBuf;

use crate::constants::DEFAULT_STUB_DIM;
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`load_embedder`](super::load_embedder).
pub struct EmbedderConfig {
    /// Path to a fastText `.vec` file. Empty means "no model".
    pub model_path: PathBuf,
    /// Stop reading the vocabulary after this many rows (`.vec` files are frequency-sorted).
    pub max_words: Option<usize>,
    /// Output dimension in stub mode.
    pub stub_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            max_words: None,
            stub_dim: DEFAULT_STUB_DIM,
            testing_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Creates a config for a `.vec` model file.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn max_words(mut self, max_words: Option<usize>) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn stub_dim(mut self, dim: usize) -> Self {
        self.stub_dim = dim;
        self
    }

    /// Validates required fields for the selected mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            if self.stub_dim == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "stub_dim must be > 0".to_string(),
                });
            }
            return Ok(());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_path.clone(),
            });
        }

        if self.max_words == Some(0) {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_words must be > 0 when set".to_string(),
            });
        }

        Ok(())
    }
}
