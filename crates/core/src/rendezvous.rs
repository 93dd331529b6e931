//! One-shot rendezvous used to park a scan while a recharge is processed
//!
//! A [`Rendezvous`] is signaled at most once. Waiting before or after the
//! signal both succeed: the signal is latched, so a recharge that completes
//! before the scan thread reaches `wait()` is not lost. Signaling twice is a
//! no-op.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Single-notification synchronization point shared between a suspended
/// scan and the payment service.
///
/// Cloning is cheap: all clones refer to the same latch.
#[derive(Clone)]
pub struct Rendezvous {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Rendezvous {
    /// Create an unsignaled rendezvous
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    /// Latch the signal and wake every waiter.
    ///
    /// Returns `true` for the call that actually latched it.
    pub fn signal(&self) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut signaled = lock.lock();
        if *signaled {
            return false;
        }
        *signaled = true;
        cvar.notify_all();
        true
    }

    /// Block until the rendezvous has been signaled.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut signaled = lock.lock();
        while !*signaled {
            cvar.wait(&mut signaled);
        }
    }

    /// Block until signaled or until `timeout` elapses.
    ///
    /// Returns `true` if the rendezvous was signaled.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut signaled = lock.lock();
        if !*signaled {
            cvar.wait_while_for(&mut signaled, |signaled| !*signaled, timeout);
        }
        *signaled
    }

    /// Whether the signal has been latched
    pub fn is_signaled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Whether two handles refer to the same latch
    pub fn same_as(&self, other: &Rendezvous) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Rendezvous {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendezvous")
            .field("signaled", &self.is_signaled())
            .finish()
    }
}
