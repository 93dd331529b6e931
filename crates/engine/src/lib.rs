//! Scheduling and composition for mtfind
//!
//! This crate sits on top of the search layer:
//! - AdmissionScheduler: tiered priority queues and one dispatch worker per
//!   registered search provider
//! - MtfindConfig: `mtfind.toml` configuration
//! - Dictionary: word list for generated queries
//! - Workload: periodic synthetic request producer
//!
//! The scheduler only knows the [`mtfind_core::SearchProvider`] seam; wiring
//! it to concrete executors and a payment authority is left to the binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dictionary;
pub mod scheduler;
pub mod workload;

pub use config::{MtfindConfig, WorkloadConfig, CONFIG_FILE_NAME};
pub use dictionary::Dictionary;
pub use scheduler::{AdmissionScheduler, SchedulerConfig, SchedulerStats, DEFAULT_PREMIUM_BIAS};
pub use workload::{Workload, WorkloadStats};
