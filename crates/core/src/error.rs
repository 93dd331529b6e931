//! Error types for mtfind
//!
//! Only synchronous, call-site failures live here. Protocol outcomes such as
//! a denied or suspended request are delivered to the client as messages
//! instead (see [`crate::message::Message`]).
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mtfind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mtfind
#[derive(Debug, Error)]
pub enum Error {
    /// The scheduler was already started when a registration or a second
    /// start was attempted. Scheduler state is unaffected.
    #[error("scheduler is already running")]
    AlreadyRunning,

    /// Configuration value out of range or unparsable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (content sources, word lists, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A word list was loaded but contained no usable words
    #[error("Dictionary at '{}' contains no words", .0.display())]
    EmptyDictionary(PathBuf),
}

impl Error {
    /// Build an [`Error::InvalidConfig`] from anything printable
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}
