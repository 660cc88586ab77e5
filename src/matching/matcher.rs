use tracing::{debug, warn};

use super::cosine::cosine_scores;
use super::lexical::tfidf_similarity;
use super::types::{MatchCandidate, MatchResult, MatchTier};
use crate::constants::{PRIMARY_THRESHOLD, SECONDARY_THRESHOLD};
use crate::corpus::CorpusSnapshot;

/// Thresholds for the two-tier policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Similarity at or above which an entry matches outright.
    pub primary_threshold: f32,
    /// Best similarity must exceed this before the lexical check is tried.
    pub secondary_threshold: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            primary_threshold: PRIMARY_THRESHOLD,
            secondary_threshold: SECONDARY_THRESHOLD,
        }
    }
}

/// Classifies a query vector against a snapshot and picks at most one entry.
///
/// Stateless apart from its thresholds; never touches cache state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityMatcher {
    config: MatcherConfig,
}

impl SimilarityMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Scores every entry, in snapshot order. Nothing is marked yet.
    pub fn score<'a>(&self, query: &[f32], snapshot: &'a CorpusSnapshot) -> Vec<MatchCandidate<'a>> {
        let entries = snapshot.entries();
        let scores = cosine_scores(query, entries.iter().map(|e| e.vector.as_slice()));

        entries
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(index, (indexed, similarity))| MatchCandidate {
                index,
                entry: &indexed.entry,
                similarity,
                is_match: false,
            })
            .collect()
    }

    /// Marks matches in place and returns the tier that produced them.
    ///
    /// Primary: every candidate at or above the primary threshold. Only when
    /// there is none, the single best candidate is promoted if its similarity
    /// exceeds the secondary threshold and its content shares a TF-IDF term
    /// with `query_text`.
    pub fn classify(&self, query_text: &str, candidates: &mut [MatchCandidate<'_>]) -> Option<MatchTier> {
        let mut any_primary = false;
        for candidate in candidates.iter_mut() {
            if candidate.similarity >= self.config.primary_threshold {
                candidate.is_match = true;
                any_primary = true;
            }
        }
        if any_primary {
            return Some(MatchTier::Primary);
        }

        let best = best_index(candidates.iter().map(|c| c.similarity))?;
        let candidate = &mut candidates[best];
        if candidate.similarity <= self.config.secondary_threshold {
            return None;
        }

        let lexical = tfidf_similarity(query_text, &candidate.entry.content);
        debug!(
            index = candidate.index,
            similarity = candidate.similarity,
            lexical,
            "Lexical fallback check"
        );
        if lexical > 0.0 {
            candidate.is_match = true;
            Some(MatchTier::Lexical)
        } else {
            None
        }
    }

    /// Picks the highest-similarity marked candidate; ties keep the earliest.
    pub fn select<'a>(&self, candidates: &[MatchCandidate<'a>]) -> Option<MatchCandidate<'a>> {
        let matched: Vec<&MatchCandidate<'a>> = candidates.iter().filter(|c| c.is_match).collect();
        best_index(matched.iter().map(|c| c.similarity)).map(|i| *matched[i])
    }

    /// Runs score, classify and select for one query.
    pub fn find_match(&self, query_text: &str, query: &[f32], snapshot: &CorpusSnapshot) -> MatchResult {
        if snapshot.is_empty() {
            warn!("Matching against an empty corpus snapshot");
            return MatchResult::NoMatch;
        }

        let mut candidates = self.score(query, snapshot);
        let Some(tier) = self.classify(query_text, &mut candidates) else {
            return MatchResult::NoMatch;
        };

        match self.select(&candidates) {
            Some(chosen) => MatchResult::Matched {
                entry: chosen.entry.clone(),
                similarity: chosen.similarity,
                tier,
            },
            None => MatchResult::NoMatch,
        }
    }
}

/// Index of the maximum value; the first one wins on ties.
fn best_index(values: impl Iterator<Item = f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values.enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
