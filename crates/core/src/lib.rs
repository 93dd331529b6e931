//! Core types for mtfind
//!
//! This crate defines the value objects shared by every layer:
//! - Client, Tier, Credit: service consumers and their credit allotments
//! - SearchRequest: query term plus monotonic creation instant
//! - ContentSource: named, decoded, read-only line sequences
//! - SearchResult: one reported occurrence
//! - Message / MessageSink: the closed set of client notifications
//! - Rendezvous: one-shot signal used while a recharge is pending
//! - text: case-insensitive find and context primitives
//! - SearchProvider: the executor seam used by the scheduler
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod content;
pub mod error;
pub mod message;
pub mod provider;
pub mod rendezvous;
pub mod request;
pub mod result;
pub mod text;

pub use client::{Admission, Client, ClientId, Credit, Tier};
pub use content::{ContentSource, SourceId};
pub use error::{Error, Result};
pub use message::{Fanout, LogSink, Message, MessageRecorder, MessageSink};
pub use provider::SearchProvider;
pub use rendezvous::Rendezvous;
pub use request::{RequestId, SearchRequest};
pub use result::SearchResult;
