//! Credit-based admission control for mtfind
//!
//! This crate implements the protocol a scan goes through before it may
//! report a match:
//! - AdmissionGate: per-request credit check (Scanning → Aborted, or
//!   Scanning → AwaitingRecharge → Scanning)
//! - PaymentAuthority: process-wide, one-at-a-time recharge transactions
//!
//! A scan never holds a lock while it is parked: the client's lock is
//! released before the recharge is requested, and the payment lock is
//! released before the rendezvous is signaled.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod payment;

pub use gate::{AdmissionGate, Verdict};
pub use payment::{
    PaymentAuthority, PaymentConfig, PaymentStats, RechargeRequest, DEFAULT_RECHARGE_AMOUNT,
};
