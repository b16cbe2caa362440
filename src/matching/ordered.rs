use super::PercentageMatch;

/// Tolerate title words appearing in the same relative order but not contiguously.
///
/// Position lookup uses the first occurrence of a token in the query, so repeated
/// words inside a title can only ever cover their first slot.
pub fn ordered_percentage_match<Q, C>(query: &[Q], corpus: &[C], threshold: f64) -> PercentageMatch
where
    Q: AsRef<str>,
    C: AsRef<str>,
{
    if query.is_empty() {
        return PercentageMatch::miss(0.0);
    }

    let mut covered = vec![false; query.len()];
    let mut cursor: Option<usize> = None;
    let mut score = 0.0;

    for token in corpus {
        let token = token.as_ref();
        let index = match query.iter().position(|q| q.as_ref() == token) {
            Some(index) => index,
            None => {
                reset(&mut covered);
                cursor = None;
                continue;
            }
        };

        if cursor.map_or(true, |c| index > c) {
            covered[index] = true;
            cursor = Some(index);
            score = coverage_percentage(&covered);
            if score > threshold {
                return PercentageMatch::hit(score);
            }
        } else {
            // Out-of-order repeat: restart tracking from this token
            reset(&mut covered);
            covered[index] = true;
            cursor = None;
        }
    }

    PercentageMatch::miss(score)
}

fn reset(covered: &mut [bool]) {
    covered.iter_mut().for_each(|slot| *slot = false);
}

fn coverage_percentage(covered: &[bool]) -> f64 {
    let hits = covered.iter().filter(|slot| **slot).count();
    hits as f64 * 100.0 / covered.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_partial_title_crosses_threshold() {
        let query = tokens("mixed fruit fly study");
        let corpus = tokens("mixed fruit fly studies");
        let result = ordered_percentage_match(&query, &corpus, 70.0);
        assert!(result.matched);
        assert_eq!(result.score, 75.0);
    }

    #[test]
    fn test_returns_first_score_above_threshold() {
        let query = tokens("a b c d e");
        let corpus = tokens("a b c d e");
        let result = ordered_percentage_match(&query, &corpus, 70.0);
        assert!(result.matched);
        assert_eq!(result.score, 80.0);
    }

    #[test]
    fn test_reordering_resets_coverage() {
        let query = tokens("a b c");
        let corpus = tokens("b a c");
        let result = ordered_percentage_match(&query, &corpus, 70.0);
        assert!(!result.matched);
        assert!((result.score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stray_token_resets_progress() {
        let query = tokens("mixed fruit fly");
        let corpus = tokens("mixed new fruit fly");
        let result = ordered_percentage_match(&query, &corpus, 70.0);
        assert!(!result.matched);
        assert!((result.score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_must_strictly_exceed_threshold() {
        let query = tokens("a b c d");
        let corpus = tokens("a b c");
        let result = ordered_percentage_match(&query, &corpus, 75.0);
        assert!(!result.matched);
        assert_eq!(result.score, 75.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let result = ordered_percentage_match(&tokens("a b"), &tokens("x y z"), 70.0);
        assert_eq!(result, PercentageMatch::miss(0.0));
    }

    #[test]
    fn test_empty_query() {
        let empty: Vec<String> = Vec::new();
        let result = ordered_percentage_match(&empty, &tokens("a b"), 70.0);
        assert_eq!(result, PercentageMatch::miss(0.0));
    }

    #[test]
    fn test_repeated_query_word_uses_first_slot() {
        // Second "data" maps to slot 0 again and counts as an out-of-order repeat
        let query = tokens("data and data");
        let corpus = tokens("data and data");
        let result = ordered_percentage_match(&query, &corpus, 70.0);
        assert!(!result.matched);
    }
}
