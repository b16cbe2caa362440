/// A normalized word: lowercase ASCII letters only.
pub type Token = String;

/// Replace every character that is not an ASCII letter or a space with a space,
/// then lowercase. Word boundaries are kept, so "state-of-the-art" becomes
/// "state of the art" rather than "stateoftheart".
pub fn preprocess(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() || c == ' ' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect()
}

/// Tokenize text into normalized words
pub fn normalize(text: &str) -> Vec<Token> {
    preprocess(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalized tokens joined with single spaces
pub fn normalize_as_string(text: &str) -> String {
    normalize(text).join(" ")
}
