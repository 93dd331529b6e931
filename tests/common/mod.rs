//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]

use mtfind::{
    AdmissionScheduler, Client, ContentSource, Credit, MessageRecorder, PaymentAuthority,
    PaymentConfig, SchedulerConfig, SearchExecutor, Tier,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sources used across the suites
pub fn corpus() -> Vec<Arc<ContentSource>> {
    vec![
        Arc::new(ContentSource::from_text(
            "source1",
            "hello world!\nthis is a test\nworld says hello",
        )),
        Arc::new(ContentSource::from_text(
            "source2",
            "world says goodbye\nhello says dave",
        )),
        Arc::new(ContentSource::from_text(
            "source3",
            "oh my god does this work? this does\nwork!\ntest!!! TEST\n",
        )),
    ]
}

/// Client whose messages land in a fresh recorder
pub fn recorded_client(tier: Tier, credit: Credit) -> (Arc<Client>, Arc<MessageRecorder>) {
    let recorder = Arc::new(MessageRecorder::new());
    let client = Arc::new(Client::new(tier, credit, recorder.clone()));
    (client, recorder)
}

/// Fully wired scheduler, executors and payment authority
pub struct Pipeline {
    pub payment: Arc<PaymentAuthority>,
    pub scheduler: Arc<AdmissionScheduler>,
    pub executors: Vec<Arc<SearchExecutor>>,
}

impl Pipeline {
    /// Build `executors` executors over `sources`, not yet started
    pub fn new(
        sources: &[Arc<ContentSource>],
        executors: usize,
        premium_bias: f64,
        recharge_amount: u32,
    ) -> Self {
        let payment = Arc::new(PaymentAuthority::new(PaymentConfig { recharge_amount }));
        let scheduler = Arc::new(
            AdmissionScheduler::new(SchedulerConfig {
                premium_bias,
                idle_backoff: Duration::from_millis(1),
                seed: Some(17),
            })
            .unwrap(),
        );
        let executors: Vec<Arc<SearchExecutor>> = (0..executors)
            .map(|_| {
                let executor = SearchExecutor::new(Arc::clone(&payment));
                for source in sources {
                    executor.add_source(Arc::clone(source));
                }
                Arc::new(executor)
            })
            .collect();
        for executor in &executors {
            scheduler.register_executor(executor.clone()).unwrap();
        }
        Self {
            payment,
            scheduler,
            executors,
        }
    }

    /// Start the payment service and the scheduler
    pub fn start(&self) {
        self.payment.start();
        self.scheduler.start().unwrap();
    }

    /// Wait until `queries` requests have been fully served
    pub fn drain(&self, queries: u64) {
        wait_until(|| self.queries_completed() == queries);
    }

    /// Stop the scheduler, then the payment service
    pub fn stop(&self) {
        self.scheduler.stop();
        self.payment.shutdown();
    }

    /// Queries completed across all executors
    pub fn queries_completed(&self) -> u64 {
        self.executors.iter().map(|e| e.queries_completed()).sum()
    }
}

/// Poll `done` until it holds, failing the test after ten seconds
pub fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for condition");
        std::thread::sleep(Duration::from_millis(2));
    }
}
