//! Run summary: message tallies and the report printed at exit.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use mtfind_concurrency::PaymentStats;
use mtfind_core::{ClientId, Message, MessageSink};
use mtfind_engine::{SchedulerStats, WorkloadStats};

/// Message sink counting deliveries per kind
#[derive(Debug, Default)]
pub struct MessageTally {
    credit_exhausted: AtomicU64,
    credit_recharged: AtomicU64,
    admission_denied: AtomicU64,
    no_results_found: AtomicU64,
    result_found: AtomicU64,
}

impl MessageTally {
    fn counter(&self, message: &Message) -> &AtomicU64 {
        match message {
            Message::CreditExhausted { .. } => &self.credit_exhausted,
            Message::CreditRecharged { .. } => &self.credit_recharged,
            Message::AdmissionDenied { .. } => &self.admission_denied,
            Message::NoResultsFound { .. } => &self.no_results_found,
            Message::ResultFound { .. } => &self.result_found,
        }
    }

    /// `(kind, count)` pairs in a fixed order
    pub fn counts(&self) -> [(&'static str, u64); 5] {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        [
            ("result_found", load(&self.result_found)),
            ("no_results_found", load(&self.no_results_found)),
            ("credit_exhausted", load(&self.credit_exhausted)),
            ("credit_recharged", load(&self.credit_recharged)),
            ("admission_denied", load(&self.admission_denied)),
        ]
    }
}

impl MessageSink for MessageTally {
    fn receive(&self, _client: ClientId, message: &Message) {
        self.counter(message).fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything reported after a run
pub struct RunSummary<'a> {
    /// Producer totals
    pub workload: WorkloadStats,
    /// Scheduler state after stop
    pub scheduler: SchedulerStats,
    /// Recharge totals
    pub payment: PaymentStats,
    /// Queries completed per executor
    pub queries_completed: Vec<u64>,
    /// Messages delivered to clients
    pub tally: &'a MessageTally,
}

/// Render the summary as aligned `key: value` lines.
pub fn format_summary(summary: &RunSummary<'_>) -> String {
    let mut out = String::new();
    let mut line = |key: &str, value: &dyn std::fmt::Display| {
        let _ = writeln!(out, "{:<22}{}", format!("{}:", key), value);
    };

    line("requests submitted", &summary.workload.requests);
    line("clients created", &summary.workload.clients);
    line("premium dispatched", &summary.scheduler.premium_dispatched);
    line("standard dispatched", &summary.scheduler.standard_dispatched);
    line(
        "left in queue",
        &(summary.scheduler.premium_queue_depth + summary.scheduler.standard_queue_depth),
    );
    let per_executor = summary
        .queries_completed
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    line("queries per executor", &per_executor);
    line("recharges", &summary.payment.recharges_completed);
    line("units credited", &summary.payment.units_credited);
    for (kind, count) in summary.tally.counts() {
        line(kind, &count);
    }
    out
}
