//! fastText word vectors in the text `.vec` format.
//!
//! The file starts with a `count dim` header followed by one `word v1 .. vD` row
//! per line. Rows are stored L2-normalized, so a sentence vector is the mean of
//! the rows of its tokens (fastText's unsupervised `get_sentence_vector`).

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info, warn};

use super::Embedder;
use super::error::EmbeddingError;

/// Up-front reservation caps. Header values beyond these are not trusted for allocation.
const PREALLOC_WORDS: usize = 1 << 16;
const PREALLOC_DIM: usize = 1 << 10;

/// Sentence embedder backed by a fastText word vector table.
pub struct FastTextEmbedder {
    vocab: HashMap<String, usize>,
    vectors: Vec<f32>,
    dim: usize,
}

impl std::fmt::Debug for FastTextEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastTextEmbedder")
            .field("words", &self.vocab.len())
            .field("dim", &self.dim)
            .finish()
    }
}

impl FastTextEmbedder {
    /// Maps `path` read-only and parses it.
    pub fn load(path: &Path, max_words: Option<usize>) -> Result<Self, EmbeddingError> {
        if !path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is dropped before
        // this function returns. Model files are not rewritten while the server runs.
        let mmap = unsafe { Mmap::map(&file)? };

        let embedder = Self::parse(&mmap, max_words)?;

        info!(
            model_path = %path.display(),
            words = embedder.vocab_len(),
            dim = embedder.dim,
            "fastText vectors loaded"
        );

        Ok(embedder)
    }

    /// Parses the `.vec` text format from memory.
    pub fn parse(bytes: &[u8], max_words: Option<usize>) -> Result<Self, EmbeddingError> {
        let mut lines = bytes.split(|&b| b == b'\n');

        let header = lines
            .next()
            .and_then(|line| std::str::from_utf8(line).ok())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| EmbeddingError::ModelLoadFailed {
                reason: "missing `count dim` header".to_string(),
            })?;

        let (declared, dim) = parse_header(header)?;
        let limit = max_words.map_or(declared, |m| m.min(declared));

        let reserve = limit.min(PREALLOC_WORDS);
        let reserve_dim = dim.min(PREALLOC_DIM);
        let mut vocab: HashMap<String, usize> = HashMap::with_capacity(reserve);
        let mut vectors: Vec<f32> = Vec::with_capacity(reserve * reserve_dim);
        let mut row: Vec<f32> = Vec::with_capacity(reserve_dim);
        let mut skipped = 0usize;

        for line in lines {
            if vocab.len() >= limit {
                break;
            }

            let Ok(line) = std::str::from_utf8(line) else {
                skipped += 1;
                continue;
            };
            let line = line.trim_end_matches(['\r', ' ']);
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split(' ').filter(|f| !f.is_empty());
            let Some(word) = fields.next() else {
                continue;
            };

            row.clear();
            let parsed = fields.all(|f| match f.parse::<f32>() {
                Ok(v) => {
                    row.push(v);
                    true
                }
                Err(_) => false,
            });
            if !parsed || row.len() != dim {
                skipped += 1;
                continue;
            }

            // Zero rows never count towards a sentence vector.
            let norm = l2_norm(&row);
            if norm == 0.0 || vocab.contains_key(word) {
                continue;
            }

            vocab.insert(word.to_string(), vocab.len());
            vectors.extend(row.iter().map(|v| v / norm));
        }

        if skipped > 0 {
            warn!(skipped, "Skipped malformed rows in fastText vectors");
        }

        if vocab.is_empty() {
            return Err(EmbeddingError::ModelLoadFailed {
                reason: "model file contains no usable word vectors".to_string(),
            });
        }

        debug!(words = vocab.len(), dim, declared, "Parsed fastText vectors");

        Ok(Self {
            vocab,
            vectors,
            dim,
        })
    }

    /// Number of words with a usable vector.
    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vocab.contains_key(word)
    }

    fn row(&self, index: usize) -> &[f32] {
        &self.vectors[index * self.dim..(index + 1) * self.dim]
    }

    /// Writes the vector of `token` into `out`; returns false when nothing is known about it.
    ///
    /// Unknown tokens fall back to the mean of their characters' vectors. Text
    /// without whitespace segmentation (CJK) arrives here as one long token.
    fn token_vector(&self, token: &str, out: &mut [f32]) -> bool {
        if let Some(&index) = self.vocab.get(token) {
            out.copy_from_slice(self.row(index));
            return true;
        }

        out.fill(0.0);
        let mut known = 0usize;
        let mut buf = [0u8; 4];
        for ch in token.chars() {
            let key: &str = ch.encode_utf8(&mut buf);
            if let Some(&index) = self.vocab.get(key) {
                for (o, v) in out.iter_mut().zip(self.row(index)) {
                    *o += v;
                }
                known += 1;
            }
        }

        if known == 0 {
            return false;
        }

        let inv = 1.0 / known as f32;
        out.iter_mut().for_each(|o| *o *= inv);
        true
    }

    /// Mean of the L2-normalized vectors of the whitespace-separated tokens.
    pub fn sentence_vector(&self, text: &str) -> Vec<f32> {
        let mut sentence = vec![0.0f32; self.dim];
        let mut word = vec![0.0f32; self.dim];
        let mut count = 0usize;

        for token in text.split_ascii_whitespace() {
            if !self.token_vector(token, &mut word) {
                continue;
            }
            let norm = l2_norm(&word);
            if norm == 0.0 {
                continue;
            }
            for (s, w) in sentence.iter_mut().zip(&word) {
                *s += w / norm;
            }
            count += 1;
        }

        if count > 0 {
            let inv = 1.0 / count as f32;
            sentence.iter_mut().for_each(|s| *s *= inv);
        }

        sentence
    }
}

impl Embedder for FastTextEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.sentence_vector(text))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn mode(&self) -> &'static str {
        "fasttext"
    }
}

fn parse_header(header: &str) -> Result<(usize, usize), EmbeddingError> {
    let invalid = || EmbeddingError::ModelLoadFailed {
        reason: format!("invalid header '{}': expected `count dim`", header),
    };

    let mut parts = header.split_whitespace();
    let count: usize = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let dim: usize = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;

    if parts.next().is_some() {
        return Err(invalid());
    }
    if dim == 0 {
        return Err(EmbeddingError::InvalidConfig {
            reason: "model dimension must be > 0".to_string(),
        });
    }

    Ok((count, dim))
}

#[inline]
fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|v| v * v).sum::<f32>().sqrt()
}
