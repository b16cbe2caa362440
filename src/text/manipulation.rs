use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use super::preprocess;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Signature shared by every built-in manipulation
pub type ManipulationFn = fn(&str) -> String;

/// Built-in strategies for turning a title into a lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ManipulationKind {
    /// Symbols to spaces and lowercase, spacing untouched
    Preprocess,
    /// Preprocess, then collapse whitespace runs to one space
    SpaceSeparatedWords,
    /// Fold accents to ASCII before SpaceSeparatedWords
    AsciiFold,
    /// SpaceSeparatedWords without common English stopwords
    RemoveStopwords,
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "in", "into", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "with",
];

const BUILTIN_MANIPULATIONS: &[(ManipulationKind, ManipulationFn)] = &[
    (ManipulationKind::Preprocess, preprocess),
    (ManipulationKind::SpaceSeparatedWords, space_separated_words),
    (ManipulationKind::AsciiFold, ascii_fold),
    (ManipulationKind::RemoveStopwords, remove_stopwords),
];

impl ManipulationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManipulationKind::Preprocess => "preprocess",
            ManipulationKind::SpaceSeparatedWords => "space-separated-words",
            ManipulationKind::AsciiFold => "ascii-fold",
            ManipulationKind::RemoveStopwords => "remove-stopwords",
        }
    }

    fn function(&self) -> ManipulationFn {
        BUILTIN_MANIPULATIONS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, f)| *f)
            .unwrap_or(space_separated_words)
    }
}

impl fmt::Display for ManipulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text manipulation applied to titles, file names, and the inaccessible list
/// so all three produce comparable keys.
#[derive(Clone)]
pub enum TextManipulation {
    Builtin(ManipulationKind),
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl TextManipulation {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        TextManipulation::Custom(Arc::new(f))
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            TextManipulation::Builtin(kind) => (kind.function())(text),
            TextManipulation::Custom(f) => f(text),
        }
    }
}

impl Default for TextManipulation {
    fn default() -> Self {
        TextManipulation::Builtin(ManipulationKind::SpaceSeparatedWords)
    }
}

impl From<ManipulationKind> for TextManipulation {
    fn from(kind: ManipulationKind) -> Self {
        TextManipulation::Builtin(kind)
    }
}

impl fmt::Debug for TextManipulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextManipulation::Builtin(kind) => write!(f, "Builtin({})", kind),
            TextManipulation::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

pub fn space_separated_words(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&preprocess(text), " ")
        .trim()
        .to_string()
}

pub fn ascii_fold(text: &str) -> String {
    let folded: String = text.nfkd().filter(|c| c.is_ascii()).collect();
    space_separated_words(&folded)
}

pub fn remove_stopwords(text: &str) -> String {
    space_separated_words(text)
        .split(' ')
        .filter(|word| !word.is_empty() && !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}
