/// Detect the query as a contiguous, in-order run inside the corpus.
///
/// Single left-to-right scan. A run is started by any token equal to the first
/// query token while no run is in progress; a mismatch ends the run and the
/// mismatching token is re-tested as a possible new start. There is no other
/// backtracking. An empty query never matches.
pub fn exact_match<Q, C>(query: &[Q], corpus: &[C]) -> bool
where
    Q: AsRef<str>,
    C: AsRef<str>,
{
    let first = match query.first() {
        Some(first) => first.as_ref(),
        None => return false,
    };

    // Index of the next query token expected while a run is in progress
    let mut cursor: Option<usize> = None;

    for token in corpus {
        let token = token.as_ref();

        if let Some(position) = cursor {
            if token == query[position].as_ref() {
                if position + 1 == query.len() {
                    return true;
                }
                cursor = Some(position + 1);
                continue;
            }
            cursor = None;
        }

        if token == first {
            if query.len() == 1 {
                return true;
            }
            cursor = Some(1);
        }
    }

    false
}
