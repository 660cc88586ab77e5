use serde::Serialize;

use crate::corpus::CorpusEntry;

/// Which rule accepted a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Embedding similarity reached the primary threshold.
    Primary,
    /// Best similarity passed the secondary threshold and the texts share a term.
    Lexical,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Primary => "primary",
            MatchTier::Lexical => "lexical",
        }
    }
}

/// One scored snapshot entry; transient, lives for a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate<'a> {
    /// Position in the snapshot.
    pub index: usize,
    pub entry: &'a CorpusEntry,
    pub similarity: f32,
    pub is_match: bool,
}

/// Outcome of matching one query.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    NoMatch,
    Matched {
        entry: CorpusEntry,
        /// Embedding similarity (also for lexical matches).
        similarity: f32,
        tier: MatchTier,
    },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    pub fn entry(&self) -> Option<&CorpusEntry> {
        match self {
            MatchResult::Matched { entry, .. } => Some(entry),
            MatchResult::NoMatch => None,
        }
    }

    pub fn similarity(&self) -> Option<f32> {
        match self {
            MatchResult::Matched { similarity, .. } => Some(*similarity),
            MatchResult::NoMatch => None,
        }
    }

    pub fn tier(&self) -> Option<MatchTier> {
        match self {
            MatchResult::Matched { tier, .. } => Some(*tier),
            MatchResult::NoMatch => None,
        }
    }
}
