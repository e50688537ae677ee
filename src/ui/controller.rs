// GUI Controller - Bridges the Slint window with the screening session
//
// This module contains the GuiController which coordinates between:
// - Slint UI (MainWindow)
// - ScreeningSession (validation, upload, probe, resets)
// - StateManager (application state)
// - EventLoopBridge (async/GUI coordination)
//
// It handles:
// - Setting up UI callbacks → session operations
// - Subscribing to state changes → UI updates
// - File browser dialogs
// - Cancelling the upload when the window closes

use crate::metrics::Metrics;
use crate::models::{AppState, MIN_JOB_DESCRIPTION_CHARS, View};
use crate::session::ScreeningSession;
use crate::state::StateChange;
use crate::ui::bridge::EventLoopBridge;
use crate::ui::view_model::{ConnectivityView, FileCardView, ResultsView, UploadingView};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ComponentHandle, ModelRc, SharedString, VecModel};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires up the Slint UI with the screening session
///
/// # Example
/// ```ignore
/// let session = Arc::new(ScreeningSession::new(state, api, metrics.clone(), &config));
/// let runtime = tokio::runtime::Runtime::new()?;
///
/// let controller = GuiController::new(session, metrics, runtime.handle().clone())?;
/// controller.run()?;  // Blocks until window is closed
/// ```
pub struct GuiController {
    ui: MainWindow,
    _bridge: EventLoopBridge<MainWindow>,
    session: Arc<ScreeningSession>,
}

impl GuiController {
    /// Create the window, wire callbacks and start the initial health probe
    pub fn new(
        session: Arc<ScreeningSession>,
        metrics: Arc<Metrics>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        let bridge = EventLoopBridge::new(&ui, tokio_handle, metrics);

        Self::sync_ui_with_state(&ui, &session.state().snapshot(), &session.base_url());
        Self::setup_callbacks(&ui, &bridge, &session);
        Self::setup_state_subscription(&bridge, &session);

        let probe_session = Arc::clone(&session);
        bridge.spawn_async(move || async move {
            // Failures are already reflected in state
            let _ = probe_session.probe_backend().await;
        });

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            session,
        })
    }

    /// Run the GUI (blocks until window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();
        self.request_cancel();
        result
    }

    /// Cancel the upload in flight, if any
    pub fn request_cancel(&self) {
        if self.session.is_uploading() {
            tracing::info!("Cancelling in-flight upload on shutdown");
        }
        self.session.cancel_upload();
    }

    /// Push a full snapshot into the window.
    ///
    /// Used at startup and after a reset; everything else is incremental.
    fn sync_ui_with_state(ui: &MainWindow, state: &AppState, base_url: &str) {
        ui.set_min_description_chars(MIN_JOB_DESCRIPTION_CHARS as i32);
        ui.set_view(screen_view(state.view));
        if ui.get_job_description().as_str() != state.job_description {
            ui.set_job_description(state.job_description.as_str().into());
        }

        Self::apply_file(ui, state.file_preview.as_ref().map(FileCardView::from));
        ui.set_error_message(state.error.clone().unwrap_or_default().into());
        Self::apply_connectivity(ui, &ConnectivityView::new(&state.connectivity, base_url));

        ui.set_is_uploading(state.upload.is_uploading());
        Self::apply_uploading(ui, &UploadingView::from(state));

        if let Some(results) = &state.results {
            ui.set_results(results_data(&ResultsView::from(results)));
        }

        tracing::debug!("UI synchronized with state");
    }

    /// Set up Slint UI callbacks
    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        session: &Arc<ScreeningSession>,
    ) {
        let s = Arc::clone(session);
        ui.on_job_description_edited(move |text| {
            s.set_job_description(text.as_str());
        });

        let s = Arc::clone(session);
        ui.on_browse_file(move || {
            tracing::debug!("Browse resume clicked");
            if let Some(path) = Self::show_file_picker() {
                // Rejections are shown through the error banner
                let _ = s.select_file(path);
            }
        });

        let s = Arc::clone(session);
        let ui_weak = ui.as_weak();
        ui.on_file_path_entered(move |text| {
            let Some(path) = parse_typed_path(text.as_str()) else {
                return;
            };
            tracing::debug!("Resume path entered: {}", path);
            if s.select_file(path).is_ok() {
                if let Some(ui) = ui_weak.upgrade() {
                    ui.set_path_input(SharedString::new());
                }
            }
        });

        let s = Arc::clone(session);
        ui.on_remove_file(move || {
            tracing::debug!("Remove file clicked");
            s.remove_file();
        });

        let s = Arc::clone(session);
        ui.on_reset_selection(move || {
            tracing::debug!("Reset selection clicked");
            s.reset_form();
        });

        let s = Arc::clone(session);
        ui.on_try_again(move || {
            tracing::debug!("Try again clicked");
            s.reset_form();
        });

        let s = Arc::clone(session);
        let handle = bridge.clone();
        ui.on_test_connection(move || {
            tracing::info!("Test backend connection clicked");
            let s = Arc::clone(&s);
            handle.spawn_async(move || async move {
                let _ = s.probe_backend().await;
            });
        });

        let s = Arc::clone(session);
        let handle = bridge.clone();
        ui.on_submit(move || {
            tracing::info!("Analyze button clicked");
            let s = Arc::clone(&s);
            handle.spawn_async(move || async move {
                if let Err(e) = s.submit().await {
                    tracing::debug!("Submit ended without results ({:?}): {}", e.category(), e);
                }
            });
        });

        let s = Arc::clone(session);
        ui.on_cancel_upload(move || {
            s.cancel_upload();
        });

        let s = Arc::clone(session);
        ui.on_analyze_another(move || {
            tracing::info!("Analyze another resume clicked");
            s.reset();
        });

        let s = Arc::clone(session);
        ui.window().on_close_requested(move || {
            s.cancel_upload();
            slint::CloseRequestResponse::HideWindow
        });
    }

    /// Subscribe to state changes and update UI accordingly
    ///
    /// This spawns a background thread that listens for state change events
    /// and updates the Slint UI via the EventLoopBridge.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        session: &Arc<ScreeningSession>,
    ) {
        let bridge = bridge.clone();
        let session = Arc::clone(session);
        let base_url = session.base_url();
        let mut rx = session.state().subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);

                        match change {
                            StateChange::ViewChanged { view } => {
                                tracing::debug!("View changed: {:?}", view);
                                bridge.update_ui(move |ui| ui.set_view(screen_view(view)));
                            }

                            // The editor is the only writer; resets resync it via StateReset
                            StateChange::JobDescriptionChanged => {}

                            StateChange::FileChanged { preview } => {
                                let card = preview.as_ref().map(FileCardView::from);
                                bridge.update_ui(move |ui| Self::apply_file(ui, card));
                            }

                            StateChange::UploadStarted => {
                                bridge.update_ui(|ui| {
                                    ui.set_is_uploading(true);
                                    ui.set_upload_percent(0);
                                });
                            }

                            StateChange::UploadProgressed { percent } => {
                                tracing::debug!("Upload progress: {}%", percent);
                                bridge.update_ui(move |ui| ui.set_upload_percent(percent as i32));
                            }

                            StateChange::UploadFinished { success } => {
                                tracing::debug!("Upload finished (success: {})", success);
                                bridge.update_ui(|ui| ui.set_is_uploading(false));
                            }

                            StateChange::ErrorChanged { message } => {
                                bridge.update_ui(move |ui| {
                                    ui.set_error_message(message.unwrap_or_default().into());
                                });
                            }

                            StateChange::ConnectivityChanged { status } => {
                                let view = ConnectivityView::new(&status, &base_url);
                                bridge.update_ui(move |ui| Self::apply_connectivity(ui, &view));
                            }

                            StateChange::PhaseAdvanced { .. } => {
                                let view = session.state().read(|s| UploadingView::from(s));
                                bridge.update_ui(move |ui| Self::apply_uploading(ui, &view));
                            }

                            StateChange::ResultsReady => {
                                let view = session
                                    .state()
                                    .read(|s| s.results.as_ref().map(ResultsView::from));
                                if let Some(view) = view {
                                    bridge.update_ui(move |ui| ui.set_results(results_data(&view)));
                                }
                            }

                            StateChange::StateReset => {
                                tracing::info!("State reset");
                                let snapshot = session.state().snapshot();
                                let base_url = base_url.clone();
                                bridge.update_ui(move |ui| {
                                    Self::sync_ui_with_state(ui, &snapshot, &base_url);
                                });
                            }
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped, resyncing",
                            skipped
                        );
                        let snapshot = session.state().snapshot();
                        let base_url = base_url.clone();
                        bridge.update_ui(move |ui| {
                            Self::sync_ui_with_state(ui, &snapshot, &base_url);
                        });
                    }
                }
            }

            tracing::debug!("State subscription thread terminated gracefully");
        });
    }

    fn apply_file(ui: &MainWindow, card: Option<FileCardView>) {
        ui.set_has_file(card.is_some());
        let card = card.unwrap_or_default();
        ui.set_file(FileCard {
            name: card.name.into(),
            size_label: card.size_label.into(),
            kind_label: card.kind_label.into(),
        });
    }

    fn apply_connectivity(ui: &MainWindow, view: &ConnectivityView) {
        ui.set_connectivity_text(view.text.as_str().into());
        ui.set_connectivity_ok(view.reachable);
        ui.set_connectivity_checking(view.checking);
    }

    fn apply_uploading(ui: &MainWindow, view: &UploadingView) {
        ui.set_upload_percent(view.upload_percent);
        ui.set_phase_percent(view.phase_percent);
        ui.set_phase_step(view.phase_step);
        ui.set_phase_hint(view.phase_hint.into());
    }

    /// Show a native file picker limited to resume documents
    fn show_file_picker() -> Option<Utf8PathBuf> {
        use rfd::FileDialog;

        FileDialog::new()
            .set_title("Select Resume")
            .add_filter("Resume (PDF, DOCX)", &["pdf", "docx"])
            .pick_file()
            .and_then(|path| {
                Utf8PathBuf::try_from(path)
                    .map_err(|e| {
                        tracing::error!("Failed to convert path to UTF-8: {}", e);
                        e
                    })
                    .ok()
            })
    }
}

fn screen_view(view: View) -> ScreenView {
    match view {
        View::Collecting => ScreenView::Collecting,
        View::Uploading => ScreenView::Uploading,
        View::Results => ScreenView::Results,
    }
}

/// Convert to the Slint struct. Must run on the event loop thread.
fn results_data(view: &ResultsView) -> ResultsData {
    let skills: Vec<SharedString> = view
        .skills
        .iter()
        .map(|skill| SharedString::from(skill.as_str()))
        .collect();

    ResultsData {
        match_percent: view.match_percent,
        skill_percent: view.skill_percent,
        confidence_percent: view.confidence_percent,
        match_band: view.match_band.index(),
        skill_band: view.skill_band.index(),
        headline: view.headline.into(),
        headline_detail: view.headline_detail.into(),
        skills: ModelRc::new(VecModel::from(skills)),
        skills_summary: view.skills_summary.as_str().into(),
        skills_hint: view.skills_hint.into(),
        suitable: view.suitable,
        prediction_title: view.prediction_title.into(),
        prediction_badge: view.prediction_badge.into(),
        prediction_text: view.prediction_text.as_str().into(),
        prediction_detail: view.prediction_detail.into(),
        classification_label: view.classification_label.as_str().into(),
        confidence_level: view.confidence_level.label().into(),
        confidence_band: view.confidence_level.index(),
    }
}

/// Normalise a typed or pasted path: trims whitespace and surrounding quotes
/// and accepts `file://` URLs.
fn parse_typed_path(text: &str) -> Option<Utf8PathBuf> {
    let trimmed = text.trim().trim_matches(|c| c == '"' || c == '\'');
    let trimmed = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(Utf8PathBuf::from(trimmed))
    }
}
