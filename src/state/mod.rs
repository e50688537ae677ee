// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{
    AnalysisResult, AppState, ConnectivityStatus, FilePreview, PhaseProgress, UploadState, View,
};
use camino::Utf8PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the GUI)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The top-level view switched
    ViewChanged { view: View },

    /// Job description text was edited or restored
    JobDescriptionChanged,

    /// A file was selected or cleared
    FileChanged { preview: Option<FilePreview> },

    /// An upload went in flight
    UploadStarted,

    /// Upload progress advanced
    UploadProgressed { percent: u8 },

    /// An upload reached a terminal state
    UploadFinished { success: bool },

    /// The error banner appeared, changed or disappeared
    ErrorChanged { message: Option<String> },

    /// Health probe status changed
    ConnectivityChanged { status: ConnectivityStatus },

    /// Decorative analysis phase ticked
    PhaseAdvanced { progress: PhaseProgress },

    /// Analysis results became available
    ResultsReady,

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`crate::models::AppState`]: The underlying state structure
/// - [`StateChange`]: Event types emitted on state mutations
/// - [`crate::session::ScreeningSession`]: Drives uploads and probes through this manager
/// - [`crate::ui::controller::GuiController`]: Primary consumer of state events
pub struct StateManager {
    /// The application state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    /// Multiple subscribers can listen for state changes
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    ///
    /// This clones the entire state, so it's safe to use without holding locks.
    /// For checking individual fields, consider using `read()` with a closure.
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let can_submit = state_manager.read(|state| state.can_submit());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Detect what changed between two states and generate events
    ///
    /// Event order matters to the GUI: the upload lifecycle is reported
    /// before the view switch it causes.
    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.job_description != new.job_description {
            changes.push(StateChange::JobDescriptionChanged);
        }

        if old.file_preview != new.file_preview {
            changes.push(StateChange::FileChanged {
                preview: new.file_preview.clone(),
            });
        }

        // Upload lifecycle
        if old.upload != new.upload {
            match (&old.upload, &new.upload) {
                (old_upload, UploadState::Uploading { percent }) => {
                    if !old_upload.is_uploading() {
                        changes.push(StateChange::UploadStarted);
                    }
                    changes.push(StateChange::UploadProgressed { percent: *percent });
                }
                (UploadState::Uploading { .. }, UploadState::Success) => {
                    changes.push(StateChange::UploadProgressed { percent: 100 });
                    changes.push(StateChange::UploadFinished { success: true });
                }
                (UploadState::Uploading { .. }, UploadState::Error { .. }) => {
                    changes.push(StateChange::UploadFinished { success: false });
                }
                _ => {
                    changes.push(StateChange::UploadProgressed {
                        percent: new.upload.percent(),
                    });
                }
            }
        }

        if old.error != new.error {
            changes.push(StateChange::ErrorChanged {
                message: new.error.clone(),
            });
        }

        if old.connectivity != new.connectivity {
            changes.push(StateChange::ConnectivityChanged {
                status: new.connectivity.clone(),
            });
        }

        if old.phase != new.phase {
            changes.push(StateChange::PhaseAdvanced {
                progress: new.phase,
            });
        }

        if old.results.is_none() && new.results.is_some() {
            changes.push(StateChange::ResultsReady);
        }

        if old.view != new.view {
            changes.push(StateChange::ViewChanged { view: new.view });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Replace the job description text
    pub fn set_job_description(&self, text: String) -> Vec<StateChange> {
        self.update(|state| {
            state.job_description = text;
        })
    }

    /// Attach a validated file to the form, clearing any stale error
    pub fn select_file(&self, path: Utf8PathBuf, preview: FilePreview) -> Vec<StateChange> {
        self.update(|state| {
            state.selected_file = Some(path);
            state.file_preview = Some(preview);
            state.error = None;
        })
    }

    /// Detach the selected file ("Remove" on the preview card)
    pub fn clear_file(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.selected_file = None;
            state.file_preview = None;
        })
    }

    /// Show an error banner without changing the view
    pub fn set_error(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.error = Some(message);
        })
    }

    /// Move to the uploading view with progress at zero
    pub fn begin_upload(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.error = None;
            state.results = None;
            state.upload = UploadState::Uploading { percent: 0 };
            state.phase = PhaseProgress::default();
            state.view = View::Uploading;
        })
    }

    /// Record upload progress. Values lower than the current one are ignored
    /// so the bar never moves backwards.
    pub fn set_upload_progress(&self, percent: u8) -> Vec<StateChange> {
        self.update(|state| {
            if let UploadState::Uploading { percent: current } = &mut state.upload {
                if percent > *current {
                    *current = percent.min(100);
                }
            }
        })
    }

    /// Advance the decorative phase display
    pub fn set_phase(&self, progress: PhaseProgress) -> Vec<StateChange> {
        self.update(|state| {
            if state.view == View::Uploading {
                state.phase = progress;
            }
        })
    }

    /// Store results and switch to the dashboard
    pub fn complete_upload(&self, results: AnalysisResult) -> Vec<StateChange> {
        self.update(|state| {
            state.upload = UploadState::Success;
            state.results = Some(results);
            state.error = None;
            state.view = View::Results;
        })
    }

    /// Return to the form with the failure shown as a banner.
    ///
    /// Submission is re-enabled because the upload is no longer in flight.
    pub fn fail_upload(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.upload = UploadState::Error {
                message: message.clone(),
            };
            state.error = Some(message);
            state.phase = PhaseProgress::default();
            state.view = View::Collecting;
        })
    }

    pub fn set_connectivity(&self, status: ConnectivityStatus) -> Vec<StateChange> {
        self.update(|state| {
            state.connectivity = status;
        })
    }

    /// "Try Again" / card "Reset": clear file, upload state and error
    pub fn reset_form(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.reset_form();
        })
    }

    /// Leave the results dashboard and start over
    pub fn reset_to_collecting(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.reset_to_collecting();
        });

        // Emit a reset event
        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BertClassification;
    use camino::Utf8Path;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            match_score: 82.0,
            skill_match_score: 75.0,
            matched_skills: vec!["Python".to_string(), "SQL".to_string()],
            prediction: "Suitable candidate".to_string(),
            bert_classification: BertClassification {
                label: "Positive".to_string(),
                confidence: 0.91,
            },
        }
    }

    fn pdf_preview() -> FilePreview {
        FilePreview::from_path(Utf8Path::new("resume.pdf"), 51_200)
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert_eq!(state.view, View::Collecting);
        assert!(state.can_submit());
        assert!(state.results.is_none());
    }

    #[test]
    fn test_select_file_emits_file_changed() {
        let manager = StateManager::new();
        manager.set_error("Invalid file type. Please upload a PDF or DOCX file.");

        let changes = manager.select_file("resume.pdf".into(), pdf_preview());

        assert!(matches!(
            &changes[0],
            StateChange::FileChanged { preview: Some(p) } if p.name == "resume.pdf"
        ));
        assert!(changes.contains(&StateChange::ErrorChanged { message: None }));
    }

    #[test]
    fn test_begin_upload() {
        let manager = StateManager::new();

        let changes = manager.begin_upload();

        assert_eq!(changes[0], StateChange::UploadStarted);
        assert_eq!(changes[1], StateChange::UploadProgressed { percent: 0 });
        assert_eq!(
            changes.last(),
            Some(&StateChange::ViewChanged {
                view: View::Uploading
            })
        );
        assert!(!manager.read(|s| s.can_submit()));
    }

    #[test]
    fn test_upload_progress_never_regresses() {
        let manager = StateManager::new();
        manager.begin_upload();

        manager.set_upload_progress(40);
        let changes = manager.set_upload_progress(25);

        assert!(changes.is_empty());
        assert_eq!(manager.read(|s| s.upload.percent()), 40);
    }

    #[test]
    fn test_progress_ignored_when_not_uploading() {
        let manager = StateManager::new();
        let changes = manager.set_upload_progress(50);
        assert!(changes.is_empty());
        assert_eq!(manager.read(|s| s.upload.clone()), UploadState::Idle);
    }

    #[test]
    fn test_complete_upload() {
        let manager = StateManager::new();
        manager.begin_upload();

        let changes = manager.complete_upload(sample_result());

        assert!(changes.contains(&StateChange::UploadProgressed { percent: 100 }));
        assert!(changes.contains(&StateChange::UploadFinished { success: true }));
        assert!(changes.contains(&StateChange::ResultsReady));
        assert_eq!(
            changes.last(),
            Some(&StateChange::ViewChanged {
                view: View::Results
            })
        );
    }

    #[test]
    fn test_fail_upload_returns_to_form() {
        let manager = StateManager::new();
        manager.begin_upload();

        let changes = manager.fail_upload("Upload timed out");

        assert!(changes.contains(&StateChange::UploadFinished { success: false }));
        assert!(changes.contains(&StateChange::ErrorChanged {
            message: Some("Upload timed out".to_string())
        }));

        let state = manager.snapshot();
        assert_eq!(state.view, View::Collecting);
        assert!(state.can_submit());
        assert_eq!(
            state.upload,
            UploadState::Error {
                message: "Upload timed out".to_string()
            }
        );
    }

    #[test]
    fn test_phase_only_tracked_while_uploading() {
        let manager = StateManager::new();
        let progress = PhaseProgress {
            percent: 10,
            step: 0,
        };

        assert!(manager.set_phase(progress).is_empty());

        manager.begin_upload();
        let changes = manager.set_phase(progress);
        assert_eq!(changes, vec![StateChange::PhaseAdvanced { progress }]);
    }

    #[test]
    fn test_reset_to_collecting() {
        let manager = StateManager::new();
        manager.set_job_description("Senior backend engineer".to_string());
        manager.select_file("resume.pdf".into(), pdf_preview());
        manager.begin_upload();
        manager.complete_upload(sample_result());

        let changes = manager.reset_to_collecting();

        assert!(changes.iter().any(|c| matches!(c, StateChange::StateReset)));
        let state = manager.snapshot();
        assert_eq!(state.view, View::Collecting);
        assert!(state.file_preview.is_none());
        assert!(state.results.is_none());
        assert_eq!(state.job_description, "Senior backend engineer");
    }

    #[test]
    fn test_connectivity_change_detection() {
        let manager = StateManager::new();

        let changes = manager.set_connectivity(ConnectivityStatus::Reachable);
        assert_eq!(
            changes,
            vec![StateChange::ConnectivityChanged {
                status: ConnectivityStatus::Reachable
            }]
        );

        // Same status again is not a change
        assert!(manager.set_connectivity(ConnectivityStatus::Reachable).is_empty());
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.begin_upload();

        let event = rx.try_recv();
        assert!(matches!(event, Ok(StateChange::UploadStarted)));
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.set_job_description("Data engineer role".to_string());

        assert_eq!(manager2.read(|s| s.job_description.clone()), "Data engineer role");
    }
}
