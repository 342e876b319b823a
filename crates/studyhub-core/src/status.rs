//! Observable loading/error state shared by a service and its views.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// What a view renders: a spinner while anything is in flight, and at most
/// one error message until it is cleared or the next call starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct ServiceStatus {
    tx: Arc<watch::Sender<StatusSnapshot>>,
    in_flight: Arc<AtomicUsize>,
}

impl ServiceStatus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self {
            tx: Arc::new(tx),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.tx.borrow().error.clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|s| s.error = Some(message));
    }

    pub fn clear_error(&self) {
        self.tx.send_if_modified(|s| s.error.take().is_some());
    }

    /// Mark one call as started. Clears the previous error; the flag drops
    /// back to idle once every guard is gone.
    pub fn begin(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard {
            status: self.clone(),
        }
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use = "dropping the guard ends the loading state"]
pub struct LoadingGuard {
    status: ServiceStatus,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.status.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.status.tx.send_modify(|s| s.loading = false);
        }
    }
}
