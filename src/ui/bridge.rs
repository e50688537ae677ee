// EventLoopBridge - Coordinates between the tokio runtime and the Slint event loop
//
// Uploads and health probes run on tokio; the window lives on Slint's single-threaded
// event loop. The bridge marshals UI updates one way and spawns async work the other.

use crate::metrics::Metrics;
use slint::ComponentHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the UI update queue. Updates beyond it are dropped.
pub const UI_UPDATE_CAPACITY: usize = 100;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Cloneable bridge between tokio tasks and a Slint component
///
/// # Example
/// ```ignore
/// let bridge = EventLoopBridge::new(&ui, runtime.handle().clone(), metrics);
///
/// let handle = bridge.clone();
/// ui.on_test_connection(move || {
///     let bridge = handle.clone();
///     handle.spawn_async(move || async move {
///         let ok = session.probe_backend().await.is_ok();
///         bridge.update_ui(move |ui| ui.set_connectivity_ok(ok));
///     });
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
    metrics: Arc<Metrics>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridge<T> {
    fn clone(&self) -> Self {
        Self {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create the bridge and its handler thread.
    ///
    /// The thread forwards queued updates to the event loop with
    /// `upgrade_in_event_loop` and exits once the event loop is gone.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle, metrics: Arc<Metrics>) -> Self {
        // Weak so the handler thread never keeps the window alive
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(UI_UPDATE_CAPACITY);

        std::thread::spawn(move || {
            tracing::debug!("EventLoopBridge handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                let result = ui_weak.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("EventLoopBridge handler thread terminated");
        });

        Self {
            tokio_handle,
            ui_update_tx,
            metrics,
        }
    }

    /// Schedule a UI update from any thread
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        enqueue(&self.ui_update_tx, Box::new(update), &self.metrics);
    }

    /// Spawn an async task on the tokio runtime from a Slint callback
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }
}

/// Queue an update without blocking. Returns false when it was dropped.
fn enqueue<T: ?Sized>(
    tx: &mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
    update: Box<dyn FnOnce(&T) + Send>,
    metrics: &Metrics,
) -> bool {
    match tx.try_send(update) {
        Ok(_) => {
            metrics.record_ui_update();
            true
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            metrics.record_ui_channel_full();
            tracing::warn!("UI update channel full - skipping update to prevent backpressure");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - handler thread has stopped");
            false
        }
    }
}
