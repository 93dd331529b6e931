//! Per-request admission gate
//!
//! One gate is created per request in flight and shared by every scan of
//! that request. Before a scan reports a match it calls
//! [`AdmissionGate::admit`]:
//!
//! ```text
//! Scanning ──credit ok──────────────────────────────▶ Proceed
//!    │
//!    ├─out of credit, not rechargeable──▶ Aborted ───▶ Abort
//!    │     (AdmissionDenied sent once per request)
//!    │
//!    └─out of credit, metered Premium──▶ AwaitingRecharge
//!          (CreditExhausted sent, recharge requested,
//!           scan parked on the rendezvous)
//!                       │ signaled
//!                       ▼
//!                   Scanning (the same match is checked again)
//! ```
//!
//! Re-checking after a recharge matters when several scans of the same
//! request exhaust together: the recharged units are shared and a scan that
//! loses the race simply asks for another recharge.

use crate::payment::{PaymentAuthority, RechargeRequest};
use mtfind_core::{Admission, Client, Message, Rendezvous, SearchRequest};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// What a scan should do with the match it is holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Report the match and keep scanning
    Proceed,
    /// Stop scanning; the request has been abandoned
    Abort,
}

/// Credit gate for one request in flight
pub struct AdmissionGate<'a> {
    payment: &'a PaymentAuthority,
    client: &'a Arc<Client>,
    request: &'a Arc<SearchRequest>,
    aborted: AtomicBool,
    suspensions: AtomicUsize,
}

impl<'a> AdmissionGate<'a> {
    /// Create the gate for `request` issued by `client`
    pub fn new(
        payment: &'a PaymentAuthority,
        client: &'a Arc<Client>,
        request: &'a Arc<SearchRequest>,
    ) -> Self {
        Self {
            payment,
            client,
            request,
            aborted: AtomicBool::new(false),
            suspensions: AtomicUsize::new(0),
        }
    }

    /// Decide whether the caller may report the match it has found.
    ///
    /// May block the calling thread until a pending recharge completes.
    /// Returns [`Verdict::Abort`] for every call once the request has been
    /// denied, whichever scan hit the denial.
    pub fn admit(&self) -> Verdict {
        loop {
            if self.is_aborted() {
                return Verdict::Abort;
            }

            match self.client.try_admit() {
                Admission::Granted => return Verdict::Proceed,
                Admission::Denied => {
                    if !self.aborted.swap(true, Ordering::AcqRel) {
                        debug!(
                            client = %self.client.id(),
                            request = %self.request,
                            "admission denied, abandoning request"
                        );
                        self.client.push_message(Message::AdmissionDenied {
                            request: Arc::clone(self.request),
                        });
                    }
                    return Verdict::Abort;
                }
                Admission::Exhausted => self.await_recharge(),
            }
        }
    }

    fn await_recharge(&self) {
        let rendezvous = Rendezvous::new();
        self.client.push_message(Message::CreditExhausted {
            rendezvous: rendezvous.clone(),
        });
        self.payment.request_recharge(RechargeRequest {
            client: Arc::clone(self.client),
            rendezvous: rendezvous.clone(),
        });

        debug!(
            client = %self.client.id(),
            request = %self.request,
            "waiting for recharge"
        );
        rendezvous.wait();
        self.suspensions.fetch_add(1, Ordering::Relaxed);
        debug!(request = %self.request, "resuming query");
    }

    /// Whether the request has been abandoned
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// How many times a scan of this request was parked awaiting recharge
    pub fn suspensions(&self) -> usize {
        self.suspensions.load(Ordering::Relaxed)
    }
}
