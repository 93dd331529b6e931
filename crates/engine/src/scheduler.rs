//! Tiered admission scheduler.
//!
//! Client requests wait in one priority queue per tier (earliest request
//! first). Each registered search provider gets a dedicated worker thread
//! that, on every iteration, samples a tier with the configured Premium
//! bias, pops the head of that tier's queue and runs the provider on it.
//!
//! There is no fallback: if the sampled tier's queue is empty the iteration
//! does nothing. Since sampling repeats every iteration, a tier can be
//! passed over for a bounded run of iterations but not forever.
//!
//! Locking: each tier queue has its own lock, held only for the push or pop
//! itself, and provider registration has a separate lock. No lock is held
//! while a provider call is in flight.

use mtfind_core::{Client, Error, Result, SearchProvider, SearchRequest, Tier};
use parking_lot::Mutex as ParkingMutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default probability of sampling the Premium queue
pub const DEFAULT_PREMIUM_BIAS: f64 = 0.8;

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Probability in `[0, 1]` that an iteration samples the Premium queue.
    /// `1.0` serves only Premium, `0.0` only Standard.
    pub premium_bias: f64,
    /// Pause after an iteration that found its sampled queue empty
    pub idle_backoff: Duration,
    /// Seed for the per-worker samplers; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            premium_bias: DEFAULT_PREMIUM_BIAS,
            idle_backoff: Duration::from_millis(1),
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Reject a bias outside `[0, 1]` (including NaN)
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.premium_bias) {
            return Err(Error::invalid_config(format!(
                "premium_bias must be within [0, 1], got {}",
                self.premium_bias
            )));
        }
        Ok(())
    }
}

/// Scheduler metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Requests waiting in the Premium queue
    pub premium_queue_depth: usize,
    /// Requests waiting in the Standard queue
    pub standard_queue_depth: usize,
    /// Requests handed to a provider from the Premium queue
    pub premium_dispatched: u64,
    /// Requests handed to a provider from the Standard queue
    pub standard_dispatched: u64,
    /// Provider calls currently in flight
    pub active_tasks: usize,
    /// Iterations that sampled an empty queue
    pub idle_iterations: u64,
    /// Number of worker threads (0 when stopped)
    pub worker_count: usize,
}

/// A queued (client, request) pair
struct SearchTask {
    client: Arc<Client>,
    request: Arc<SearchRequest>,
    sequence: u64,
}

impl Eq for SearchTask {}

impl PartialEq for SearchTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// Earlier timestamp first, then lower sequence (submitted first) first
impl Ord for SearchTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .request
            .timestamp()
            .cmp(&self.request.timestamp())
            .then(other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for SearchTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct SchedulerInner {
    /// Indexed by [`Tier::index`]
    queues: [ParkingMutex<BinaryHeap<SearchTask>>; 2],
    running: AtomicBool,
    sequence: AtomicU64,
    dispatched: [AtomicU64; 2],
    idle_iterations: AtomicU64,
    active_tasks: AtomicUsize,
    config: SchedulerConfig,
}

impl SchedulerInner {
    fn sample_tier(&self, rng: &mut StdRng) -> Tier {
        if rng.gen_bool(self.config.premium_bias) {
            Tier::Premium
        } else {
            Tier::Standard
        }
    }
}

/// Tiered priority scheduler dispatching client requests to providers.
pub struct AdmissionScheduler {
    inner: Arc<SchedulerInner>,
    executors: ParkingMutex<Vec<Arc<dyn SearchProvider>>>,
    workers: ParkingMutex<Vec<JoinHandle<()>>>,
}

impl AdmissionScheduler {
    /// Create a stopped scheduler with no providers.
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(SchedulerInner {
                queues: [
                    ParkingMutex::new(BinaryHeap::new()),
                    ParkingMutex::new(BinaryHeap::new()),
                ],
                running: AtomicBool::new(false),
                sequence: AtomicU64::new(0),
                dispatched: [AtomicU64::new(0), AtomicU64::new(0)],
                idle_iterations: AtomicU64::new(0),
                active_tasks: AtomicUsize::new(0),
                config,
            }),
            executors: ParkingMutex::new(Vec::new()),
            workers: ParkingMutex::new(Vec::new()),
        })
    }

    /// Add a provider to the dispatch pool; it gets its own worker on
    /// [`start`](Self::start).
    ///
    /// Returns `Err(Error::AlreadyRunning)` once the scheduler is running.
    pub fn register_executor(&self, executor: Arc<dyn SearchProvider>) -> Result<()> {
        let mut executors = self.executors.lock();
        if self.inner.running.load(AtomicOrdering::Acquire) {
            return Err(Error::AlreadyRunning);
        }
        executors.push(executor);
        Ok(())
    }

    /// Enqueue a request in the queue of the client's tier.
    ///
    /// Accepted whether or not the scheduler is running; queued requests
    /// are served once it is.
    pub fn submit(&self, client: Arc<Client>, request: Arc<SearchRequest>) {
        let tier = client.tier();
        let sequence = self.inner.sequence.fetch_add(1, AtomicOrdering::Relaxed);
        debug!(client = %client.id(), %request, %tier, "request queued");
        self.inner.queues[tier.index()].lock().push(SearchTask {
            client,
            request,
            sequence,
        });
    }

    /// Spawn one worker per registered provider.
    ///
    /// Workers are named `mtfind-worker-0`, `mtfind-worker-1`, etc.
    /// Returns `Err(Error::AlreadyRunning)` if already started.
    pub fn start(&self) -> Result<()> {
        let executors = self.executors.lock();
        if self.inner.running.swap(true, AtomicOrdering::AcqRel) {
            return Err(Error::AlreadyRunning);
        }
        if executors.is_empty() {
            warn!("scheduler started with no registered executors");
        }

        let mut workers = self.workers.lock();
        for (i, executor) in executors.iter().enumerate() {
            let inner = Arc::clone(&self.inner);
            let executor = Arc::clone(executor);
            let rng = match inner.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_entropy(),
            };
            let handle = std::thread::Builder::new()
                .name(format!("mtfind-worker-{}", i))
                .spawn(move || worker_loop(&inner, executor.as_ref(), rng))
                .expect("failed to spawn scheduler worker thread");
            workers.push(handle);
        }

        info!(
            workers = workers.len(),
            premium_bias = self.inner.config.premium_bias,
            "scheduler started"
        );
        Ok(())
    }

    /// Clear the running flag and join every worker.
    ///
    /// Blocks until each worker's in-flight provider call has finished,
    /// including any recharge it is waiting on. Queued requests stay
    /// queued. Idempotent.
    pub fn stop(&self) {
        self.inner.running.store(false, AtomicOrdering::Release);

        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        let joined = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                error!("scheduler worker thread panicked");
            }
        }
        if joined > 0 {
            info!(workers = joined, "scheduler stopped");
        }
    }

    /// Whether workers are running
    pub fn is_running(&self) -> bool {
        self.inner.running.load(AtomicOrdering::Acquire)
    }

    /// Requests waiting in either queue
    pub fn pending(&self) -> usize {
        self.inner.queues.iter().map(|q| q.lock().len()).sum()
    }

    /// Return a snapshot of scheduler metrics.
    pub fn stats(&self) -> SchedulerStats {
        let depth = |tier: Tier| self.inner.queues[tier.index()].lock().len();
        let dispatched =
            |tier: Tier| self.inner.dispatched[tier.index()].load(AtomicOrdering::Relaxed);
        SchedulerStats {
            premium_queue_depth: depth(Tier::Premium),
            standard_queue_depth: depth(Tier::Standard),
            premium_dispatched: dispatched(Tier::Premium),
            standard_dispatched: dispatched(Tier::Standard),
            active_tasks: self.inner.active_tasks.load(AtomicOrdering::Relaxed),
            idle_iterations: self.inner.idle_iterations.load(AtomicOrdering::Relaxed),
            worker_count: self.workers.lock().len(),
        }
    }
}

impl Drop for AdmissionScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// RAII guard that decrements `active_tasks` on drop, even if the provider
/// panics.
struct ActiveTaskGuard<'a> {
    inner: &'a SchedulerInner,
}

impl Drop for ActiveTaskGuard<'_> {
    fn drop(&mut self) {
        self.inner.active_tasks.fetch_sub(1, AtomicOrdering::Release);
    }
}

fn worker_loop(inner: &SchedulerInner, executor: &dyn SearchProvider, mut rng: StdRng) {
    while inner.running.load(AtomicOrdering::Acquire) {
        let tier = inner.sample_tier(&mut rng);

        // Pop under the tier lock only; the provider runs without it
        let task = inner.queues[tier.index()].lock().pop();
        let Some(task) = task else {
            inner.idle_iterations.fetch_add(1, AtomicOrdering::Relaxed);
            std::thread::sleep(inner.config.idle_backoff);
            continue;
        };

        // Active before dispatched, so `dispatched == n && active == 0`
        // means the n-th call has returned
        inner.active_tasks.fetch_add(1, AtomicOrdering::AcqRel);
        let _guard = ActiveTaskGuard { inner };
        inner.dispatched[tier.index()].fetch_add(1, AtomicOrdering::AcqRel);

        debug!(client = %task.client.id(), request = %task.request, %tier, "dispatching");
        let call = std::panic::AssertUnwindSafe(|| executor.query(&task.client, &task.request));
        if let Err(e) = std::panic::catch_unwind(call) {
            error!(
                request = %task.request,
                "search provider panicked: {:?}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    }
}
