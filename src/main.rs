//! Resume Screener - desktop client for the AI resume screening service
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend. It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (HTTP requests and the phase animation)
//! - State management ([`StateManager`]) and the [`ScreeningSession`]
//! - GUI controller ([`GuiController`] - bridges Slint UI with the session)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Health probe, multipart upload, phase ticker
//! - **State listener**: Background std::thread for reactive UI updates
//!
//! # Execution Flow
//!
//! 1. Load `Screener Data/Screener Config.yaml` (+ `SCREENER_*` overrides)
//! 2. Initialize logging → logs/resume-screener.<date>
//! 3. Create tokio runtime
//! 4. Create StateManager, HTTP client and ScreeningSession
//! 5. Create GuiController, which probes the backend once
//! 6. Run Slint event loop (blocks until window closed)
//! 7. Cancel any upload, log metrics, shut the runtime down with a 5s timeout

use anyhow::{Context, Result};
use camino::Utf8Path;
use resume_screener::config::CONFIG_DIR;
use resume_screener::logging::{self, LOG_DIR};
use resume_screener::services::HttpScreeningApi;
use resume_screener::ui::GuiController;
use resume_screener::{APP_NAME, ConfigManager, Metrics, ScreeningSession, StateManager, VERSION};
use std::sync::Arc;
use std::time::Duration;

/// Number of tokio worker threads; the workload is a handful of concurrent requests
const WORKER_THREADS: usize = 2;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(CONFIG_DIR)?;
    let config = config_manager.load()?;

    // Held until main returns so buffered log lines are flushed
    let _log_guard = logging::setup_logging(Utf8Path::new(LOG_DIR), config.debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Backend: {} (health timeout {}s, upload timeout {}s)",
        config.base_url(),
        config.health_timeout_secs,
        config.upload_timeout_secs
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(WORKER_THREADS)
        .thread_name("screener-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    tracing::info!(
        "Tokio runtime initialized with {} worker threads",
        WORKER_THREADS
    );

    let state_manager = Arc::new(StateManager::new());
    let metrics = Arc::new(Metrics::new());
    let api = Arc::new(HttpScreeningApi::new(&config).context("Failed to create HTTP client")?);
    let session = Arc::new(ScreeningSession::new(
        state_manager,
        api,
        metrics.clone(),
        &config,
    ));

    let gui_controller =
        GuiController::new(session.clone(), metrics.clone(), runtime.handle().clone())?;

    tracing::info!("GUI controller initialized, launching window");

    // Blocks until the window is closed
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");

    if session.is_uploading() {
        tracing::warn!("Window closed during upload - cancelling...");
        session.cancel_upload();

        // Give the upload task a moment to observe the cancellation
        std::thread::sleep(Duration::from_millis(200));
    }

    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
