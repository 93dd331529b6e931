//! Word list used to generate search queries

use mtfind_core::{ContentSource, Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::path::Path;

/// Words shorter than this (in characters) are not worth searching for
const MIN_WORD_CHARS: usize = 4;

/// A sorted, deduplicated, non-empty list of query words.
///
/// Built once at startup and shared read-only by the workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    /// Load a word list, one word per line. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// `Error::Io` if the file cannot be read, `Error::EmptyDictionary` if
    /// it holds no words.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let words: BTreeSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return Err(Error::EmptyDictionary(path.to_path_buf()));
        }
        Ok(Self {
            words: words.into_iter().collect(),
        })
    }

    /// Collect the searchable words of `sources`: whitespace-separated
    /// tokens made only of alphanumeric characters and longer than three
    /// characters, lowercased. Returns `None` when there are none.
    pub fn from_sources(sources: &[impl AsRef<ContentSource>]) -> Option<Self> {
        let words: BTreeSet<String> = sources
            .iter()
            .flat_map(|source| source.as_ref().lines())
            .flat_map(|line| line.split_whitespace())
            .filter(|token| {
                token.chars().count() >= MIN_WORD_CHARS && token.chars().all(char::is_alphanumeric)
            })
            .map(str::to_lowercase)
            .collect();
        Self::from_words(words)
    }

    /// Build from arbitrary words; `None` if `words` is empty
    pub fn from_words<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: BTreeSet<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return None;
        }
        Some(Self {
            words: words.into_iter().collect(),
        })
    }

    /// Pick a word uniformly at random
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // Never empty, see constructors
        self.words.choose(rng).map(String::as_str).unwrap_or_default()
    }

    /// Words in sorted order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
