//! Synthetic request producer
//!
//! Every period the workload creates a batch of random clients and submits
//! a few dictionary-word queries for each of them, until told to stop.

use crate::config::WorkloadConfig;
use crate::dictionary::Dictionary;
use crate::scheduler::AdmissionScheduler;
use mtfind_core::{Client, Credit, MessageSink, Rendezvous, RequestId, SearchRequest, Tier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Totals for one workload run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadStats {
    /// Batches produced
    pub batches: u64,
    /// Clients created
    pub clients: u64,
    /// Requests submitted
    pub requests: u64,
}

/// Request producer feeding an [`AdmissionScheduler`]
pub struct Workload {
    scheduler: Arc<AdmissionScheduler>,
    dictionary: Arc<Dictionary>,
    sink: Arc<dyn MessageSink>,
    config: WorkloadConfig,
    premium_credit: u32,
    next_request: AtomicU64,
}

impl Workload {
    /// Create a producer; clients it creates deliver their messages to `sink`.
    pub fn new(
        scheduler: Arc<AdmissionScheduler>,
        dictionary: Arc<Dictionary>,
        sink: Arc<dyn MessageSink>,
        config: WorkloadConfig,
        premium_credit: u32,
    ) -> Self {
        Self {
            scheduler,
            dictionary,
            sink,
            config,
            premium_credit,
            next_request: AtomicU64::new(1),
        }
    }

    /// Create a client with a random tier (even odds).
    ///
    /// Premium clients are metered with the configured credit; Standard
    /// clients are unmetered.
    pub fn random_client<R: Rng + ?Sized>(&self, rng: &mut R) -> Arc<Client> {
        let (tier, credit) = if rng.gen_bool(0.5) {
            (Tier::Premium, Credit::Metered(self.premium_credit))
        } else {
            (Tier::Standard, Credit::Unmetered)
        };
        Arc::new(Client::new(tier, credit, Arc::clone(&self.sink)))
    }

    /// Build a request for a random dictionary word
    pub fn random_request<R: Rng + ?Sized>(&self, rng: &mut R) -> Arc<SearchRequest> {
        let id: RequestId = self.next_request.fetch_add(1, Ordering::Relaxed);
        Arc::new(SearchRequest::new(id, self.dictionary.random_word(rng)))
    }

    /// Create one batch of clients and submit their requests.
    ///
    /// Returns the number of requests submitted.
    pub fn submit_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut submitted = 0;
        for _ in 0..self.config.clients {
            let client = self.random_client(rng);
            for _ in 0..self.config.requests_per_client {
                let request = self.random_request(rng);
                self.scheduler.submit(Arc::clone(&client), request);
                submitted += 1;
            }
        }
        debug!(
            clients = self.config.clients,
            requests = submitted,
            "workload batch submitted"
        );
        submitted
    }

    /// Produce a batch every period until `stop` is signaled.
    ///
    /// The first batch is produced immediately. `seed` makes the run
    /// reproducible.
    pub fn run_until(&self, stop: &Rendezvous, seed: Option<u64>) -> WorkloadStats {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut stats = WorkloadStats::default();

        info!(
            clients = self.config.clients,
            requests_per_client = self.config.requests_per_client,
            period_ms = self.config.period_ms,
            "workload started"
        );
        while !stop.is_signaled() {
            let submitted = self.submit_batch(&mut rng);
            stats.batches += 1;
            stats.clients += self.config.clients as u64;
            stats.requests += submitted as u64;

            if stop.wait_for(self.config.period()) {
                break;
            }
        }
        info!(
            batches = stats.batches,
            requests = stats.requests,
            "workload stopped"
        );
        stats
    }
}
