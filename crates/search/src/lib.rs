//! Parallel multi-source search for mtfind
//!
//! This crate provides:
//! - SearchExecutor: fan-out/fan-in executor over a set of content sources
//! - Occurrences: offset-walking, case-insensitive occurrence iterator
//! - scan_source: the per-source scan that applies the admission gate to
//!   every occurrence before reporting it
//!
//! # Usage
//!
//! ```ignore
//! use mtfind_search::SearchExecutor;
//!
//! let executor = SearchExecutor::new(payment);
//! executor.add_source(source);
//! let report = executor.execute(&client, &request);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod scan;

pub use executor::{QueryReport, SearchExecutor};
pub use scan::{scan_source, Occurrence, Occurrences, ScanOutcome};
