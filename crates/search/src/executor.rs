//! Fan-out/fan-in search executor
//!
//! A [`SearchExecutor`] owns a set of content sources. Each query takes a
//! snapshot of that set, scans every source of the snapshot on its own
//! thread, and returns once all scans have finished. Adding or removing a
//! source only affects queries that start afterwards.
//!
//! The source-set lock is held just long enough to copy the snapshot: a
//! scan may park on a recharge for an unbounded time and must not keep
//! other queries (or registrations) waiting while it does.

use crate::scan::{scan_source, ScanOutcome};
use mtfind_concurrency::{AdmissionGate, PaymentAuthority};
use mtfind_core::{Client, ContentSource, SearchProvider, SearchRequest, SourceId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Summary of one executed query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryReport {
    /// Sources in the snapshot the query ran against
    pub sources: usize,
    /// Results reported across all sources
    pub results: usize,
    /// Whether the request was abandoned for lack of credit
    pub aborted: bool,
    /// Times a scan was parked awaiting recharge
    pub suspensions: usize,
    /// Wall-clock time of the whole query
    pub elapsed: Duration,
}

/// Parallel multi-source search executor.
pub struct SearchExecutor {
    sources: Mutex<Vec<Arc<ContentSource>>>,
    payment: Arc<PaymentAuthority>,
    queries_completed: AtomicU64,
}

impl SearchExecutor {
    /// Create an executor with no sources that recharges through `payment`
    pub fn new(payment: Arc<PaymentAuthority>) -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
            payment,
            queries_completed: AtomicU64::new(0),
        }
    }

    /// Register a source for subsequent queries
    pub fn add_source(&self, source: Arc<ContentSource>) {
        self.sources.lock().push(source);
    }

    /// Unregister a source. Returns whether it was registered.
    pub fn remove_source(&self, id: SourceId) -> bool {
        let mut sources = self.sources.lock();
        let before = sources.len();
        sources.retain(|s| s.id() != id);
        sources.len() != before
    }

    /// Snapshot of the registered sources
    pub fn sources(&self) -> Vec<Arc<ContentSource>> {
        self.sources.lock().clone()
    }

    /// Queries completed by this executor
    pub fn queries_completed(&self) -> u64 {
        self.queries_completed.load(Ordering::Relaxed)
    }

    /// Run `request` for `client` against every registered source.
    ///
    /// Blocks until every per-source scan has finished, including scans
    /// parked on a recharge.
    pub fn execute(&self, client: &Arc<Client>, request: &Arc<SearchRequest>) -> QueryReport {
        let started = Instant::now();
        let snapshot = self.sources();
        let gate = AdmissionGate::new(&self.payment, client, request);

        let outcomes: Vec<ScanOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = snapshot
                .iter()
                .map(|source| {
                    let gate = &gate;
                    std::thread::Builder::new()
                        .name(format!("mtfind-scan-{}", source.id()))
                        .spawn_scoped(scope, move || scan_source(source, client, request, gate))
                        .expect("failed to spawn scan thread")
                })
                .collect();

            handles
                .into_iter()
                .zip(&snapshot)
                .map(|(handle, source)| {
                    handle.join().unwrap_or_else(|_| {
                        error!(%request, source = %source, "scan panicked");
                        ScanOutcome::Aborted { reported: 0 }
                    })
                })
                .collect()
        });

        self.queries_completed.fetch_add(1, Ordering::Relaxed);
        let report = QueryReport {
            sources: snapshot.len(),
            results: outcomes.iter().map(|o| o.reported()).sum(),
            aborted: gate.is_aborted(),
            suspensions: gate.suspensions(),
            elapsed: started.elapsed(),
        };
        debug!(
            client = %client.id(),
            %request,
            sources = report.sources,
            results = report.results,
            aborted = report.aborted,
            suspensions = report.suspensions,
            "query complete"
        );
        report
    }
}

impl SearchProvider for SearchExecutor {
    fn query(&self, client: &Arc<Client>, request: &Arc<SearchRequest>) {
        self.execute(client, request);
    }
}
