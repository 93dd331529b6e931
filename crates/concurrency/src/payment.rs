//! Payment authority: serialized credit recharge transactions
//!
//! Only one recharge transaction runs at a time, process-wide, whichever
//! client asked for it. Requests are normally handed to a dedicated service
//! thread; when that thread is not running they are processed on the
//! caller's thread, still under the same transaction lock.
//!
//! # Transaction
//!
//! ```text
//! 1. Acquire the payment transaction lock
//! 2. Deliver CreditRecharged to the client (credits it under the client's lock)
//! 3. Release the payment transaction lock
//! 4. Signal the request's rendezvous (exactly once)
//! ```
//!
//! Every request that is accepted is eventually signaled, including those
//! still queued when [`PaymentAuthority::shutdown`] is called: the service
//! thread drains its queue before exiting.

use mtfind_core::{Client, Message, Rendezvous};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

/// Default units credited by one recharge
pub const DEFAULT_RECHARGE_AMOUNT: u32 = 15;

/// Payment authority configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Units credited per recharge transaction
    pub recharge_amount: u32,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            recharge_amount: DEFAULT_RECHARGE_AMOUNT,
        }
    }
}

/// A request to recharge one client, answered through `rendezvous`
#[derive(Debug, Clone)]
pub struct RechargeRequest {
    /// Client to credit
    pub client: Arc<Client>,
    /// Signaled once the client has been credited
    pub rendezvous: Rendezvous,
}

/// Payment metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentStats {
    /// Recharge transactions completed
    pub recharges_completed: u64,
    /// Total units credited across all clients
    pub units_credited: u64,
    /// Highest number of transactions ever observed in progress at once
    pub peak_in_progress: usize,
}

/// State shared by the authority handle and its service thread
struct Ledger {
    recharge_amount: u32,
    transaction_lock: Mutex<()>,
    in_progress: AtomicUsize,
    peak_in_progress: AtomicUsize,
    recharges_completed: AtomicU64,
    units_credited: AtomicU64,
}

impl Ledger {
    fn process(&self, request: RechargeRequest) {
        {
            let _transaction = self.transaction_lock.lock();
            let now = self.in_progress.fetch_add(1, Ordering::AcqRel) + 1;
            self.peak_in_progress.fetch_max(now, Ordering::AcqRel);

            request.client.push_message(Message::CreditRecharged {
                amount: self.recharge_amount,
            });

            self.in_progress.fetch_sub(1, Ordering::AcqRel);
            self.recharges_completed.fetch_add(1, Ordering::Relaxed);
            self.units_credited
                .fetch_add(u64::from(self.recharge_amount), Ordering::Relaxed);
        }

        debug!(
            client = %request.client.id(),
            amount = self.recharge_amount,
            "recharge complete"
        );
        request.rendezvous.signal();
    }
}

/// The process-wide recharge service.
///
/// Construct one at the composition root and share it by `Arc` with every
/// search executor.
pub struct PaymentAuthority {
    ledger: Arc<Ledger>,
    sender: Mutex<Option<Sender<RechargeRequest>>>,
    service: Mutex<Option<JoinHandle<()>>>,
}

impl PaymentAuthority {
    /// Create an authority. No service thread runs until [`start`](Self::start);
    /// until then requests are processed on the caller's thread.
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            ledger: Arc::new(Ledger {
                recharge_amount: config.recharge_amount,
                transaction_lock: Mutex::new(()),
                in_progress: AtomicUsize::new(0),
                peak_in_progress: AtomicUsize::new(0),
                recharges_completed: AtomicU64::new(0),
                units_credited: AtomicU64::new(0),
            }),
            sender: Mutex::new(None),
            service: Mutex::new(None),
        }
    }

    /// Units credited per transaction
    pub fn recharge_amount(&self) -> u32 {
        self.ledger.recharge_amount
    }

    /// Start the service thread. Calling it again while running is a no-op.
    pub fn start(&self) {
        let mut service = self.service.lock();
        if service.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel::<RechargeRequest>();
        let ledger = Arc::clone(&self.ledger);
        let handle = std::thread::Builder::new()
            .name("mtfind-payment".to_string())
            .spawn(move || {
                for request in rx {
                    ledger.process(request);
                }
            })
            .expect("failed to spawn payment service thread");

        *self.sender.lock() = Some(tx);
        *service = Some(handle);
    }

    /// Hand a recharge request to the authority.
    ///
    /// Never blocks on the transaction itself when the service thread is
    /// running; the caller waits on the request's rendezvous instead.
    pub fn request_recharge(&self, request: RechargeRequest) {
        let sender = self.sender.lock().clone();
        match sender {
            Some(tx) => {
                if let Err(mpsc::SendError(request)) = tx.send(request) {
                    self.ledger.process(request);
                }
            }
            None => self.ledger.process(request),
        }
    }

    /// Run one recharge transaction on the calling thread.
    pub fn recharge(&self, request: RechargeRequest) {
        self.ledger.process(request);
    }

    /// Stop the service thread after it has drained every queued request.
    ///
    /// Later requests are processed on the caller's thread. Idempotent.
    pub fn shutdown(&self) {
        drop(self.sender.lock().take());
        let handle = self.service.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("payment service thread panicked");
            }
        }
    }

    /// Return a snapshot of payment metrics.
    pub fn stats(&self) -> PaymentStats {
        PaymentStats {
            recharges_completed: self.ledger.recharges_completed.load(Ordering::Relaxed),
            units_credited: self.ledger.units_credited.load(Ordering::Relaxed),
            peak_in_progress: self.ledger.peak_in_progress.load(Ordering::Acquire),
        }
    }
}

impl Default for PaymentAuthority {
    fn default() -> Self {
        Self::new(PaymentConfig::default())
    }
}

impl Drop for PaymentAuthority {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtfind_core::{ClientId, Credit, MessageRecorder, MessageSink, Tier};
    use static_assertions::assert_impl_all;
    use std::sync::Barrier;
    use std::time::Duration;

    assert_impl_all!(PaymentAuthority: Send, Sync);
    assert_impl_all!(RechargeRequest: Send, Sync);

    fn metered_client(units: u32) -> (Arc<Client>, Arc<MessageRecorder>) {
        let recorder = Arc::new(MessageRecorder::new());
        let client = Arc::new(Client::new(
            Tier::Premium,
            Credit::Metered(units),
            recorder.clone(),
        ));
        (client, recorder)
    }

    #[test]
    fn test_inline_recharge_credits_and_signals() {
        let authority = PaymentAuthority::default();
        let (client, recorder) = metered_client(0);
        let rendezvous = Rendezvous::new();

        authority.request_recharge(RechargeRequest {
            client: Arc::clone(&client),
            rendezvous: rendezvous.clone(),
        });

        assert!(rendezvous.is_signaled());
        assert_eq!(client.credit(), Credit::Metered(DEFAULT_RECHARGE_AMOUNT));
        assert_eq!(recorder.count("credit_recharged"), 1);
    }

    #[test]
    fn test_service_thread_signals_waiter() {
        let authority = PaymentAuthority::new(PaymentConfig { recharge_amount: 3 });
        authority.start();
        let (client, _) = metered_client(0);
        let rendezvous = Rendezvous::new();

        authority.request_recharge(RechargeRequest {
            client: Arc::clone(&client),
            rendezvous: rendezvous.clone(),
        });

        assert!(rendezvous.wait_for(Duration::from_secs(5)));
        assert_eq!(client.credit(), Credit::Metered(3));
        authority.shutdown();
    }

    #[test]
    fn test_shutdown_drains_queued_requests() {
        let authority = PaymentAuthority::default();
        authority.start();

        let rendezvous: Vec<Rendezvous> = (0..20).map(|_| Rendezvous::new()).collect();
        for r in &rendezvous {
            let (client, _) = metered_client(0);
            authority.request_recharge(RechargeRequest {
                client,
                rendezvous: r.clone(),
            });
        }
        authority.shutdown();

        assert!(rendezvous.iter().all(Rendezvous::is_signaled));
        assert_eq!(authority.stats().recharges_completed, 20);
    }

    #[test]
    fn test_requests_after_shutdown_run_inline() {
        let authority = PaymentAuthority::default();
        authority.start();
        authority.shutdown();
        authority.shutdown();

        let (client, _) = metered_client(0);
        let rendezvous = Rendezvous::new();
        authority.request_recharge(RechargeRequest {
            client,
            rendezvous: rendezvous.clone(),
        });
        assert!(rendezvous.is_signaled());
    }

    /// Sink that fails the test if two recharge deliveries overlap
    struct OverlapDetector {
        inside: AtomicUsize,
        overlaps: AtomicUsize,
    }

    impl MessageSink for OverlapDetector {
        fn receive(&self, _client: ClientId, message: &Message) {
            if let Message::CreditRecharged { .. } = message {
                if self.inside.fetch_add(1, Ordering::SeqCst) != 0 {
                    self.overlaps.fetch_add(1, Ordering::SeqCst);
                }
                std::thread::sleep(Duration::from_millis(2));
                self.inside.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_concurrent_recharges_are_serialized() {
        let authority = Arc::new(PaymentAuthority::default());
        let detector = Arc::new(OverlapDetector {
            inside: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        });
        let barrier = Arc::new(Barrier::new(4));

        // Different clients, racing on the caller-thread path
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let authority = Arc::clone(&authority);
                let detector = Arc::clone(&detector);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let client = Arc::new(Client::new(
                        Tier::Premium,
                        Credit::Metered(0),
                        detector,
                    ));
                    barrier.wait();
                    for _ in 0..5 {
                        authority.recharge(RechargeRequest {
                            client: Arc::clone(&client),
                            rendezvous: Rendezvous::new(),
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(detector.overlaps.load(Ordering::SeqCst), 0);
        let stats = authority.stats();
        assert_eq!(stats.recharges_completed, 20);
        assert_eq!(stats.units_credited, 20 * u64::from(DEFAULT_RECHARGE_AMOUNT));
        assert_eq!(stats.peak_in_progress, 1);
    }
}
