use log::trace;

use super::{
    exact_match, jumbled_percentage_match, ordered_percentage_match, MatchConfig, MatchResult,
    MatchStrategy, EXACT_MATCH_SCORE,
};
use crate::text::normalize;

/// Runs the matchers in escalating order of permissiveness and stops at the
/// first success.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleMatcher {
    config: MatchConfig,
}

impl TitleMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Validate a raw title against raw document text
    pub fn validate(&self, title: &str, text: &str) -> MatchResult {
        let query = normalize(title);
        let corpus = normalize(text);
        self.validate_tokens(&query, &corpus)
    }

    /// Validate already-normalized tokens
    pub fn validate_tokens<Q, C>(&self, query: &[Q], corpus: &[C]) -> MatchResult
    where
        Q: AsRef<str>,
        C: AsRef<str>,
    {
        if exact_match(query, corpus) {
            return MatchResult {
                matched: true,
                score: EXACT_MATCH_SCORE,
                strategy: MatchStrategy::Exact,
            };
        }

        let ordered = ordered_percentage_match(query, corpus, self.config.ordered_threshold);
        if ordered.matched {
            return MatchResult {
                matched: true,
                score: ordered.score,
                strategy: MatchStrategy::OrderedPercentage,
            };
        }
        trace!("Ordered match failed at {:.1}%", ordered.score);

        let jumbled = jumbled_percentage_match(
            query,
            corpus,
            self.config.jumbled_threshold,
            self.config.wrong_word_limit,
        );
        MatchResult {
            matched: jumbled.matched,
            score: jumbled.score,
            strategy: if jumbled.matched {
                MatchStrategy::JumbledPercentage
            } else {
                MatchStrategy::None
            },
        }
    }
}

/// Validate with default thresholds
pub fn validate(title: &str, text: &str) -> MatchResult {
    TitleMatcher::default().validate(title, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_reports_unit_score() {
        let result = validate(
            "Mixed Fruit-Fly Optimization",
            "Journal of Things. Mixed fruit fly optimization for pricing, 2020",
        );
        assert_eq!(
            result,
            MatchResult {
                matched: true,
                score: 1.0,
                strategy: MatchStrategy::Exact,
            }
        );
    }

    #[test]
    fn test_falls_back_to_ordered() {
        let result = validate("Mixed fruit fly study", "mixed fruit fly studies");
        assert!(result.matched);
        assert_eq!(result.strategy, MatchStrategy::OrderedPercentage);
        assert_eq!(result.score, 75.0);
    }

    #[test]
    fn test_falls_back_to_jumbled() {
        let result = validate("Neural network model", "model, neural network -- page 3");
        assert!(result.matched);
        assert_eq!(result.strategy, MatchStrategy::JumbledPercentage);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_no_match_reports_jumbled_score() {
        let result = validate("neural network model", "neural xx network yy model");
        assert!(!result.matched);
        assert_eq!(result.strategy, MatchStrategy::None);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_empty_inputs_do_not_match() {
        let result = validate("", "some text");
        assert!(!result.matched);
        assert_eq!(result.strategy, MatchStrategy::None);

        let result = validate("A title", "");
        assert!(!result.matched);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = TitleMatcher::new(MatchConfig {
            ordered_threshold: 90.0,
            jumbled_threshold: 90.0,
            wrong_word_limit: 2,
        });
        let result = strict.validate("Mixed fruit fly study", "mixed fruit fly studies");
        assert!(!result.matched);
    }
}
