//! Screening session - the operations behind every button in the window.
//!
//! [`ScreeningSession`] owns the workflow Collecting -> Uploading -> Results
//! and is the only thing that drives [`StateManager`] transitions for it.
//! The GUI calls into the session and renders whatever state results.

use crate::metrics::Metrics;
use crate::models::{AnalysisResult, FilePreview, ScreenerConfig};
use crate::services::{
    ConnectivityProber, ErrorCategory, PhaseTicker, ProbeError, ProgressTracker, ScreeningApi,
    UploadError, UploadRequest, ValidationError, validation,
};
use crate::state::StateManager;
use bytes::Bytes;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a submit did not produce results
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("An upload is already in progress")]
    Busy,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl SubmitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SubmitError::Busy => ErrorCategory::InvalidInput,
            SubmitError::Invalid(e) => e.category(),
            SubmitError::Upload(e) => e.category(),
        }
    }
}

pub struct ScreeningSession {
    state: Arc<StateManager>,
    api: Arc<dyn ScreeningApi>,
    prober: ConnectivityProber,
    metrics: Arc<Metrics>,
    phase_tick: Duration,

    /// Cancellation handle of the upload in flight, if any
    active_upload: Mutex<Option<CancellationToken>>,
}

impl ScreeningSession {
    pub fn new(
        state: Arc<StateManager>,
        api: Arc<dyn ScreeningApi>,
        metrics: Arc<Metrics>,
        config: &ScreenerConfig,
    ) -> Self {
        let prober = ConnectivityProber::new(api.clone(), state.clone(), metrics.clone());
        Self {
            state,
            api,
            prober,
            metrics,
            phase_tick: Duration::from_millis(config.phase_tick_ms.max(1)),
            active_upload: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn base_url(&self) -> String {
        self.api.base_url()
    }

    pub fn set_job_description(&self, text: impl Into<String>) {
        self.state.set_job_description(text.into());
    }

    /// Attach a file picked by the user.
    ///
    /// Unsupported or unreadable files are refused with a banner and the
    /// current selection is left alone.
    pub fn select_file(&self, path: impl Into<Utf8PathBuf>) -> Result<FilePreview, ValidationError> {
        let path = path.into();
        match validation::inspect_file(&path) {
            Ok(preview) => {
                info!(
                    "Selected {} ({}, {})",
                    preview.name,
                    preview.kind_label(),
                    preview.size_label()
                );
                self.state.select_file(path, preview.clone());
                Ok(preview)
            }
            Err(e) => {
                warn!("Rejected file {}: {:?}", path, e);
                self.state.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// "Remove" on the file card
    pub fn remove_file(&self) {
        self.state.clear_file();
    }

    /// "Try Again" on the banner and "Reset" on the file card
    pub fn reset_form(&self) {
        debug!("Clearing file and upload state");
        self.state.reset_form();
    }

    /// "Analyze Another Resume" from the results dashboard
    pub fn reset(&self) {
        self.cancel_upload();
        info!("Resetting to the form for another resume");
        self.state.reset_to_collecting();
    }

    pub fn is_uploading(&self) -> bool {
        self.active_upload.lock().unwrap().is_some()
    }

    /// Abort the upload in flight. No-op when idle.
    pub fn cancel_upload(&self) {
        if let Some(token) = self.active_upload.lock().unwrap().as_ref() {
            info!("Cancelling upload in flight");
            token.cancel();
        }
    }

    /// Probe the backend health endpoint
    pub async fn probe_backend(&self) -> Result<(), ProbeError> {
        self.prober.probe().await
    }

    /// Validate the form, upload it and land on results or back on the form.
    ///
    /// Nothing touches the network when validation fails, and a second
    /// submit while one is in flight is refused without side effects.
    pub async fn submit(&self) -> Result<AnalysisResult, SubmitError> {
        if self.is_uploading() {
            warn!("Submit ignored: an upload is already in progress");
            return Err(SubmitError::Busy);
        }

        let (job_description, selected_file, preview) = self.state.read(|state| {
            (
                state.job_description.clone(),
                state.selected_file.clone(),
                state.file_preview.clone(),
            )
        });

        let kind = match validation::validate(preview.as_ref(), &job_description) {
            Ok(kind) => kind,
            Err(e) => return Err(self.reject(e)),
        };
        let (Some(path), Some(preview)) = (selected_file, preview) else {
            return Err(self.reject(ValidationError::MissingFile));
        };

        let Some(slot) = UploadSlot::claim(self) else {
            return Err(SubmitError::Busy);
        };
        let cancel = slot.cancel.clone();

        let contents = match read_file(&path).await {
            Ok(contents) => contents,
            Err(e) => return Err(self.reject(e)),
        };

        self.state.begin_upload();
        self.metrics.record_upload_started();
        info!(
            "Submitting {} ({}) with a {}-character job description",
            preview.name,
            preview.size_label(),
            job_description.trim().chars().count()
        );

        let progress = ProgressTracker::new();
        let mirror = self.spawn_progress_mirror(&progress);
        let phase_state = self.state.clone();
        let ticker = PhaseTicker::spawn(self.phase_tick, move |phase| {
            phase_state.set_phase(phase);
        });

        let request = UploadRequest {
            file_name: preview.name.clone(),
            mime_type: kind.mime_type().to_string(),
            contents,
            job_description,
        };

        let started = Instant::now();
        let result = self
            .api
            .upload_resume(request, progress.clone(), cancel.clone())
            .await;

        ticker.stop();
        mirror.abort();
        slot.release();

        // A cancel that raced a successful response still counts as a cancel
        let result = match result {
            Ok(_) if cancel.is_cancelled() => Err(UploadError::Cancelled),
            other => other,
        };

        match result {
            Ok(analysis) => {
                progress.complete();
                let elapsed = started.elapsed();
                info!(
                    "Analysis received in {:.2}s: match {:.1}%, skills {:.1}%, prediction {:?}",
                    elapsed.as_secs_f64(),
                    analysis.match_score,
                    analysis.skill_match_score,
                    analysis.prediction
                );
                self.metrics.record_upload_succeeded(elapsed);
                self.state.complete_upload(analysis.clone());
                Ok(analysis)
            }
            Err(e) => {
                warn!("Upload failed after {:.2}s: {}", started.elapsed().as_secs_f64(), e);
                self.metrics.record_upload_failed(e.category());
                self.state.fail_upload(e.to_string());
                Err(e.into())
            }
        }
    }

    fn reject(&self, error: ValidationError) -> SubmitError {
        debug!("Submission rejected: {:?}", error);
        self.metrics.record_validation_rejection();
        self.state.set_error(error.to_string());
        error.into()
    }

    /// Copy tracker progress into app state while the upload runs
    fn spawn_progress_mirror(&self, progress: &ProgressTracker) -> tokio::task::JoinHandle<()> {
        let mut rx = progress.subscribe();
        let state = self.state.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let percent = *rx.borrow_and_update();
                // 100 is applied by complete_upload together with the results
                if percent < 100 {
                    debug!("Upload progress {}%", percent);
                    state.set_upload_progress(percent);
                }
            }
        })
    }
}

/// Exclusive hold on the single upload slot for one `submit()` call.
///
/// Dropped without [`UploadSlot::release`] (the submit future was dropped
/// mid-flight) it cancels the request, frees the slot and leaves the
/// uploading view with "Upload cancelled".
struct UploadSlot<'a> {
    session: &'a ScreeningSession,
    cancel: CancellationToken,
    released: bool,
}

impl<'a> UploadSlot<'a> {
    fn claim(session: &'a ScreeningSession) -> Option<Self> {
        let mut active = session.active_upload.lock().unwrap();
        if active.is_some() {
            return None;
        }
        let cancel = CancellationToken::new();
        *active = Some(cancel.clone());
        Some(Self {
            session,
            cancel,
            released: false,
        })
    }

    /// Free the slot after the request finished normally
    fn release(mut self) {
        self.session.active_upload.lock().unwrap().take();
        self.released = true;
    }
}

impl Drop for UploadSlot<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.cancel.cancel();
        self.session.active_upload.lock().unwrap().take();

        let stranded = self.session.state.read(|state| state.upload.is_uploading());
        if stranded {
            warn!("Submit abandoned mid-upload, returning to the form");
            self.session
                .metrics
                .record_upload_failed(ErrorCategory::Cancelled);
            self.session.state.fail_upload(UploadError::Cancelled.to_string());
        }
    }
}

async fn read_file(path: &Utf8Path) -> Result<Bytes, ValidationError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| ValidationError::FileUnreadable {
            path: path.to_string(),
            detail: e.to_string(),
        })
}
