pub const FACTMATCH_STATUS_HEADER: &str = "X-Factmatch-Status";
pub const FACTMATCH_STATUS_HEALTHY: &str = "healthy";
pub const FACTMATCH_STATUS_READY: &str = "ready";
pub const FACTMATCH_STATUS_NOT_READY: &str = "not_ready";
pub const FACTMATCH_STATUS_ERROR: &str = "error";

/// Outcome of a match request as reported in the status header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Match,
    NoMatch,
}

impl MatchStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            MatchStatus::Match => "match",
            MatchStatus::NoMatch => "no_match",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}
