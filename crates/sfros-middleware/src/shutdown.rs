//! [`ShutdownSignal`] – one-way runtime shutdown request.
//!
//! Once raised the signal stays raised.  Every clone observes the same flag,
//! so the request may come from the Ctrl-C handler thread, from the
//! application's tick, or from a test.
//!
//! # Example
//!
//! ```rust
//! use sfros_middleware::ShutdownSignal;
//!
//! let signal = ShutdownSignal::new();
//! let observer = signal.clone();
//!
//! assert!(signal.request("simulation finished"));
//! assert!(!signal.request("again")); // already raised
//! assert!(observer.is_requested());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    requests: AtomicUsize,
    notify: Notify,
}

/// Shared, cloneable shutdown flag with async notification.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal.
    ///
    /// Returns `true` for the request that actually raised it and `false` if
    /// it was already raised.
    pub fn request(&self, reason: &str) -> bool {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);
        let first = !self.inner.requested.swap(true, Ordering::SeqCst);
        if first {
            info!(reason, "runtime shutdown requested");
            self.inner.notify.notify_waiters();
        } else {
            debug!(reason, "runtime shutdown already requested");
        }
        first
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Total calls to [`request`][Self::request], including redundant ones.
    pub fn request_count(&self) -> usize {
        self.inner.requests.load(Ordering::SeqCst)
    }

    /// Resolve once the signal has been raised.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent request is
            // never missed.
            notified.as_mut().enable();
            if self.is_requested() {
                return;
            }
            notified.await;
        }
    }
}
