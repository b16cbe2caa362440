pub mod exact;
pub mod jumbled;
pub mod orchestrator;
pub mod ordered;

pub use exact::exact_match;
pub use jumbled::{jumbled_percentage_match, multiset_similarity};
pub use orchestrator::{validate, TitleMatcher};
pub use ordered::ordered_percentage_match;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default percentage a partial match must exceed
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Default number of consecutive stray tokens that breaks a jumbled window
pub const DEFAULT_WRONG_WORD_LIMIT: usize = 2;

/// Score reported when the exact matcher succeeds
pub const EXACT_MATCH_SCORE: f64 = 1.0;

/// Which matcher produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    Exact,
    OrderedPercentage,
    JumbledPercentage,
    None,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::OrderedPercentage => "ordered-percentage",
            MatchStrategy::JumbledPercentage => "jumbled-percentage",
            MatchStrategy::None => "none",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single percentage matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageMatch {
    pub matched: bool,
    pub score: f64,
}

impl PercentageMatch {
    pub fn hit(score: f64) -> Self {
        Self { matched: true, score }
    }

    pub fn miss(score: f64) -> Self {
        Self {
            matched: false,
            score,
        }
    }
}

/// Uniform result of running the matchers in escalating order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub score: f64,
    pub strategy: MatchStrategy,
}

/// Thresholds for the percentage matchers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    pub ordered_threshold: f64,
    pub jumbled_threshold: f64,
    pub wrong_word_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ordered_threshold: DEFAULT_THRESHOLD,
            jumbled_threshold: DEFAULT_THRESHOLD,
            wrong_word_limit: DEFAULT_WRONG_WORD_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&MatchStrategy::OrderedPercentage).unwrap(),
            "\"ordered-percentage\""
        );
        assert_eq!(serde_json::to_string(&MatchStrategy::None).unwrap(), "\"none\"");
    }

    #[test]
    fn test_strategy_display_matches_serde() {
        for strategy in [
            MatchStrategy::Exact,
            MatchStrategy::OrderedPercentage,
            MatchStrategy::JumbledPercentage,
            MatchStrategy::None,
        ] {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json.trim_matches('"'), strategy.to_string());
        }
    }
}
