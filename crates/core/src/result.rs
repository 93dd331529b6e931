//! Search results: one reported occurrence of a query in a source

use crate::content::ContentSource;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// A single occurrence, as reported to the client.
///
/// `line` and `column` are 1-based; `column` and `length` count characters.
/// `is_final` marks the last occurrence of the request's query within this
/// source; results from other sources may still follow.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Source the occurrence was found in
    pub source: Arc<ContentSource>,
    /// 1-based line number
    pub line: usize,
    /// 1-based character column of the first matched character
    pub column: usize,
    /// Match length in characters
    pub length: usize,
    /// The matched words, extended to whitespace on both sides
    pub context: String,
    /// When the result was produced
    pub timestamp: Instant,
    /// Last occurrence in this source for this request
    pub is_final: bool,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} \"{}\"{}",
            self.source.name(),
            self.line,
            self.column,
            self.context,
            if self.is_final { " (final)" } else { "" }
        )
    }
}
