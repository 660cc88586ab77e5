//! Similarity scoring and the two-tier match policy.

mod cosine;
mod lexical;
mod matcher;
mod types;


pub use cosine::{cosine_scores, cosine_similarity};
pub use lexical::{tfidf_similarity, tokenize};
pub use matcher::{MatcherConfig, SimilarityMatcher};
pub use types::{MatchCandidate, MatchResult, MatchTier};
