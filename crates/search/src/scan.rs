//! Per-source scan
//!
//! A scan walks the occurrences of the query in one source, in line order,
//! each search starting at the end of the previous match. Every occurrence
//! goes through the admission gate before it is reported; a scan parked on
//! a recharge resumes with the very occurrence it was holding, so nothing
//! is skipped or reported twice across the suspension.
//!
//! `is_final` comes from a lookahead: after the current occurrence has been
//! admitted, the walker is probed for the next one (rest of the line, then
//! later lines). Only the last occurrence in the source is final.

use mtfind_concurrency::{AdmissionGate, Verdict};
use mtfind_core::text::{char_column, char_len, find_next, fold_case, surrounding_context};
use mtfind_core::{Client, ContentSource, Message, SearchRequest, SearchResult};
use std::sync::Arc;
use std::time::Instant;

/// One occurrence located in a source; offsets are bytes into the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// 0-based index of the line
    pub line_index: usize,
    /// Byte offset of the first matched character
    pub start: usize,
    /// Byte offset just past the match
    pub end: usize,
}

/// Iterator over the non-overlapping occurrences of a needle in a list of
/// lines, leftmost first.
pub struct Occurrences<'a> {
    lines: &'a [String],
    needle: &'a str,
    line: usize,
    offset: usize,
}

impl<'a> Occurrences<'a> {
    /// Walk `lines` looking for `needle` (case-insensitive)
    pub fn new(lines: &'a [String], needle: &'a str) -> Self {
        Self {
            lines,
            needle,
            line: 0,
            offset: 0,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        while let Some(line) = self.lines.get(self.line) {
            if let Some((start, end)) = find_next(line, self.needle, self.offset) {
                self.offset = end;
                return Some(Occurrence {
                    line_index: self.line,
                    start,
                    end,
                });
            }
            self.line += 1;
            self.offset = 0;
        }
        None
    }
}

/// How a single source scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every occurrence was examined
    Completed {
        /// Results reported from this source
        reported: usize,
    },
    /// The request was abandoned mid-scan
    Aborted {
        /// Results reported before the abort
        reported: usize,
    },
}

impl ScanOutcome {
    /// Results reported from this source
    pub fn reported(self) -> usize {
        match self {
            ScanOutcome::Completed { reported } | ScanOutcome::Aborted { reported } => reported,
        }
    }
}

/// Scan one source for `request` on behalf of `client`.
///
/// Sends `ResultFound` for every admitted occurrence and `NoResultsFound`
/// if the source has none at all (unless the request was abandoned).
pub fn scan_source(
    source: &Arc<ContentSource>,
    client: &Arc<Client>,
    request: &Arc<SearchRequest>,
    gate: &AdmissionGate<'_>,
) -> ScanOutcome {
    let needle = fold_case(request.query());
    let lines = source.lines();
    let mut occurrences = Occurrences::new(lines, &needle).peekable();
    let mut reported = 0;

    while let Some(occurrence) = occurrences.next() {
        if gate.admit() == Verdict::Abort {
            return ScanOutcome::Aborted { reported };
        }

        let line = &lines[occurrence.line_index];
        let is_final = occurrences.peek().is_none();
        let result = SearchResult {
            source: Arc::clone(source),
            line: occurrence.line_index + 1,
            column: char_column(line, occurrence.start),
            length: char_len(line, occurrence.start, occurrence.end),
            context: surrounding_context(line, occurrence.start, occurrence.end).to_string(),
            timestamp: Instant::now(),
            is_final,
        };
        client.push_message(Message::ResultFound {
            request: Arc::clone(request),
            result,
        });
        reported += 1;
    }

    if reported == 0 {
        if gate.is_aborted() {
            return ScanOutcome::Aborted { reported };
        }
        client.push_message(Message::NoResultsFound {
            request: Arc::clone(request),
            source: source.id(),
        });
    }
    ScanOutcome::Completed { reported }
}
