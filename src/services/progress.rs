use std::sync::Arc;
use tokio::sync::watch;

/// Highest percentage reported while bytes are still in flight.
///
/// 100 is reserved for a parsed, successful response.
pub const IN_FLIGHT_CAP: u8 = 99;

/// Monotonic upload progress publisher.
///
/// Wraps a `watch` channel so any number of observers see the latest
/// percentage without queueing. Reports that would move the value
/// backwards are dropped.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<u8>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Observe progress updates
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }

    /// Latest published percentage
    pub fn current(&self) -> u8 {
        *self.tx.borrow()
    }

    /// Report `loaded` of `total` bytes handed to the transport
    pub fn report(&self, loaded: u64, total: u64) {
        if total == 0 {
            return;
        }

        let percent = percent_of(loaded, total).min(IN_FLIGHT_CAP);
        self.tx.send_if_modified(|current| {
            if percent > *current {
                *current = percent;
                true
            } else {
                false
            }
        });
    }

    /// Mark the upload as finished successfully
    pub fn complete(&self) {
        self.tx.send_replace(100);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// `round(loaded * 100 / total)`, rounding halves up
pub fn percent_of(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let loaded = loaded.min(total) as u128;
    let total = total as u128;
    ((loaded * 200 + total) / (total * 2)) as u8
}
