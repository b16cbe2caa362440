use std::collections::{HashMap, HashSet};

use super::PercentageMatch;

type Multiset<'a> = HashMap<&'a str, usize>;

fn multiset<'a, T: AsRef<str>>(tokens: &'a [T]) -> Multiset<'a> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_ref()).or_insert(0) += 1;
    }
    counts
}

/// Percentage overlap of two token multisets, always within `[0, 100]`.
///
/// A key with equal counts on both sides adds `2 * count` to numerator and
/// denominator. Differing counts add the smaller count to the numerator and the
/// larger to the denominator. A key on one side only adds its count to the
/// denominator.
///
/// Unequal counts add `min`, not `2 * min`, to the numerator so the score
/// never exceeds 100.
pub fn multiset_similarity<'a>(
    left: &HashMap<&'a str, usize>,
    right: &HashMap<&'a str, usize>,
) -> f64 {
    let mut numerator = 0usize;
    let mut denominator = 0usize;

    let keys: HashSet<&str> = left.keys().chain(right.keys()).copied().collect();
    for key in keys {
        match (left.get(key), right.get(key)) {
            (Some(&a), Some(&b)) if a == b => {
                numerator += 2 * a;
                denominator += 2 * a;
            }
            (Some(&a), Some(&b)) => {
                let min = a.min(b);
                numerator += min;
                denominator += min + a.abs_diff(b);
            }
            (Some(&count), None) | (None, Some(&count)) => denominator += count,
            (None, None) => {}
        }
    }

    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 * 100.0 / denominator as f64
}

/// Tolerate stray tokens between genuine title words, ignoring order.
///
/// Query words accumulate into a window. Each stray token either breaks the
/// window (once `wrong_word_limit` consecutive strays are seen) or scores and
/// then clears it.
pub fn jumbled_percentage_match<Q, C>(
    query: &[Q],
    corpus: &[C],
    threshold: f64,
    wrong_word_limit: usize,
) -> PercentageMatch
where
    Q: AsRef<str>,
    C: AsRef<str>,
{
    let query_multiset = multiset(query);
    let mut window: Multiset = HashMap::new();
    let mut skipped = 0usize;
    let mut score = 0.0;

    for token in corpus {
        let token = token.as_ref();
        if query_multiset.contains_key(token) {
            skipped = 0;
            *window.entry(token).or_insert(0) += 1;
            continue;
        }

        skipped += 1;
        if skipped >= wrong_word_limit {
            window.clear();
            continue;
        }

        score = multiset_similarity(&query_multiset, &window);
        if score > threshold {
            return PercentageMatch::hit(score);
        }
        window.clear();
    }

    PercentageMatch::miss(score)
}
