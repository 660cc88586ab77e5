//! Embedding providers.
//!
//! - [`fasttext`] loads fastText word vectors and builds sentence vectors.
//! - [`stub`] produces deterministic vectors when no model is configured.
//! - [`lookup`] is a fixed-table test double (behind `mock`).

mod config;
mod error;
/// fastText `.vec` embedder.
pub mod fasttext;
#[cfg(any(test, feature = "mock"))]
pub mod lookup;
/// Deterministic stub embedder.
pub mod stub;


use std::sync::Arc;

use tracing::warn;

pub use config::EmbedderConfig;
pub use error::EmbeddingError;
pub use fasttext::FastTextEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use lookup::LookupEmbedder;
pub use stub::StubEmbedder;

/// Maps text to a fixed-dimension dense vector.
///
/// Implementations must be deterministic for identical input and hold no
/// mutable state that changes results between calls.
pub trait Embedder: Send + Sync {
    /// Embeds a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds several texts, in order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Output dimension.
    fn dimension(&self) -> usize;

    /// Short backend label (`"fasttext"`, `"stub"`, ...).
    fn mode(&self) -> &'static str;
}

/// Builds the embedder described by `config`.
pub fn load_embedder(config: EmbedderConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    config.validate()?;

    if config.testing_stub {
        warn!(dim = config.stub_dim, "Embedder running in STUB mode (exact repeats only)");
        return Ok(Arc::new(StubEmbedder::new(config.stub_dim)));
    }

    let embedder = FastTextEmbedder::load(&config.model_path, config.max_words)?;
    Ok(Arc::new(embedder))
}
