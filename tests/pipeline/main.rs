//! Pipeline Integration Tests
//!
//! Producer → scheduler → executors → client messages, with the payment
//! authority in the loop.

#[path = "../common/mod.rs"]
mod common;

mod credit_protocol;
mod dispatch_order;
mod end_to_end;
mod workload;
