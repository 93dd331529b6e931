//! Content sources: named, read-only sequences of lines
//!
//! Decoding happens once, when the source is built. After that a source is
//! immutable and shared by `Arc` between every executor that registered it.

use crate::error::Result;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of a content source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        SourceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An already-decoded text source
pub struct ContentSource {
    id: SourceId,
    name: String,
    lines: Vec<String>,
}

impl ContentSource {
    /// Build a source from in-memory text, splitting on `\n` and `\r\n`
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::from_lines(name, text.lines().map(String::from).collect())
    }

    /// Build a source from pre-split lines
    pub fn from_lines(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            id: SourceId::next(),
            name: name.into(),
            lines,
        }
    }

    /// Read a text file. Invalid UTF-8 is replaced rather than rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::from_text(path.display().to_string(), &text))
    }

    /// Stable identity
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Human-readable name (usually the file path)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lines in order; line `n` (1-based) is `lines()[n - 1]`
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentSource({})", self.name)
    }
}
