//! mtfind - multi-threaded find
//!
//! A tiered, credit-metered parallel text search engine. Clients submit
//! search requests to an admission scheduler that serves Premium and
//! Standard queues with a configurable bias; each request is fanned out
//! across every content source, and every match is gated on the client's
//! credit, suspending the scan while a recharge is in progress.
//!
//! # Quick Start
//!
//! ```ignore
//! use mtfind::{
//!     AdmissionScheduler, Client, ContentSource, Credit, LogSink, PaymentAuthority,
//!     SchedulerConfig, SearchExecutor, SearchRequest, Tier,
//! };
//! use std::sync::Arc;
//!
//! let payment = Arc::new(PaymentAuthority::default());
//! payment.start();
//!
//! let executor = SearchExecutor::new(Arc::clone(&payment));
//! executor.add_source(Arc::new(ContentSource::from_text("notes", "the cat sat")));
//!
//! let scheduler = AdmissionScheduler::new(SchedulerConfig::default())?;
//! scheduler.register_executor(Arc::new(executor))?;
//! scheduler.start()?;
//!
//! let client = Arc::new(Client::new(Tier::Premium, Credit::Metered(15), Arc::new(LogSink)));
//! scheduler.submit(client, Arc::new(SearchRequest::new(1, "cat")));
//! ```
//!
//! # Architecture
//!
//! - `mtfind-core`: value objects, messages, text primitives, errors
//! - `mtfind-concurrency`: admission gate and payment authority
//! - `mtfind-search`: fan-out/fan-in search executor
//! - `mtfind-engine`: admission scheduler, configuration, workload

pub use mtfind_concurrency::*;
pub use mtfind_core::*;
pub use mtfind_engine::*;
pub use mtfind_search::*;
