// Session metrics
//
// Lightweight counters for uploads, health probes and UI traffic, logged on shutdown

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::services::ErrorCategory;

/// Process-wide counters
///
/// Uses atomic operations for thread-safe tracking without locks.
#[derive(Debug)]
pub struct Metrics {
    pub uploads_started: AtomicU64,
    pub uploads_succeeded: AtomicU64,
    pub uploads_failed: AtomicU64,
    pub uploads_cancelled: AtomicU64,

    /// Wall-clock time of successful uploads, in milliseconds
    pub total_upload_time_ms: AtomicU64,

    pub probes_ok: AtomicU64,
    pub probes_failed: AtomicU64,

    /// Submissions refused by local validation
    pub validation_rejections: AtomicU64,

    /// Number of UI updates queued to the event loop
    pub ui_updates: AtomicU64,

    /// Number of UI updates dropped because the channel was full
    pub ui_update_channel_full: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            uploads_started: AtomicU64::new(0),
            uploads_succeeded: AtomicU64::new(0),
            uploads_failed: AtomicU64::new(0),
            uploads_cancelled: AtomicU64::new(0),
            total_upload_time_ms: AtomicU64::new(0),
            probes_ok: AtomicU64::new(0),
            probes_failed: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            ui_update_channel_full: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_upload_started(&self) {
        self.uploads_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload_succeeded(&self, duration: Duration) {
        self.uploads_succeeded.fetch_add(1, Ordering::Relaxed);
        self.total_upload_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed upload. Cancellations are counted separately.
    pub fn record_upload_failed(&self, category: ErrorCategory) {
        if category == ErrorCategory::Cancelled {
            self.uploads_cancelled.fetch_add(1, Ordering::Relaxed);
        } else {
            self.uploads_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_probe(&self, reachable: bool) {
        if reachable {
            self.probes_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.probes_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_validation_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_channel_full(&self) {
        self.ui_update_channel_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average duration of successful uploads in milliseconds
    pub fn avg_upload_time_ms(&self) -> f64 {
        let total = self.total_upload_time_ms.load(Ordering::Relaxed);
        let count = self.uploads_succeeded.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Uploads: {} started, {} succeeded, {} failed, {} cancelled (avg {:.0}ms)",
            self.uploads_started.load(Ordering::Relaxed),
            self.uploads_succeeded.load(Ordering::Relaxed),
            self.uploads_failed.load(Ordering::Relaxed),
            self.uploads_cancelled.load(Ordering::Relaxed),
            self.avg_upload_time_ms()
        );
        tracing::info!(
            "Health probes: {} ok, {} failed; validation rejections: {}",
            self.probes_ok.load(Ordering::Relaxed),
            self.probes_failed.load(Ordering::Relaxed),
            self.validation_rejections.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {}, channel full errors: {}",
            self.ui_updates.load(Ordering::Relaxed),
            self.ui_update_channel_full.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
