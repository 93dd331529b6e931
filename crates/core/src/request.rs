//! Search requests
//!
//! A request is a query term plus the monotonic instant it was created at.
//! Requests are immutable and shared by `Arc`; the creation instant is the
//! scheduling key within a tier (earlier is served first).

use std::fmt;
use std::time::Instant;

/// Search request identifier, assigned by the producer
pub type RequestId = u64;

/// A single search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    id: RequestId,
    query: String,
    timestamp: Instant,
}

impl SearchRequest {
    /// Create a request stamped with the current monotonic time
    pub fn new(id: RequestId, query: impl Into<String>) -> Self {
        Self::with_timestamp(id, query, Instant::now())
    }

    /// Create a request with an explicit creation instant
    pub fn with_timestamp(id: RequestId, query: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            id,
            query: query.into(),
            timestamp,
        }
    }

    /// Request identifier
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Query term as submitted (not case-folded)
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Creation instant
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchRequest({}, \"{}\")", self.id, self.query)
    }
}
