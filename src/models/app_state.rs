use crate::models::{AnalysisResult, FilePreview, UploadState};
use camino::Utf8PathBuf;

/// Minimum number of non-whitespace-trimmed characters in a job description
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 10;

/// Top-level view shown in the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Job description + file selection form
    #[default]
    Collecting,
    /// Upload in flight, progress + decorative phases
    Uploading,
    /// Analysis dashboard
    Results,
}

/// Reachability of the backend as seen by the last health probe
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectivityStatus {
    #[default]
    Unknown,
    Checking,
    Reachable,
    Unreachable {
        message: String,
    },
}

/// Decorative progress shown while the backend is working.
///
/// Advances on a timer and has no relationship to the real request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseProgress {
    pub percent: u8,
    pub step: usize,
}

/// Single source of truth for all application state.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`].
/// Never mutate it directly - go through the manager so change events fire.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    // Form input
    pub job_description: String,
    pub selected_file: Option<Utf8PathBuf>,
    pub file_preview: Option<FilePreview>,

    // Runtime state
    pub view: View,
    pub upload: UploadState,
    pub connectivity: ConnectivityStatus,
    pub phase: PhaseProgress,

    /// Banner text shown over the current view
    pub error: Option<String>,

    // Results
    pub results: Option<AnalysisResult>,
}

impl AppState {
    /// Submission is allowed whenever no upload is in flight
    pub fn can_submit(&self) -> bool {
        !self.upload.is_uploading()
    }

    pub fn has_file(&self) -> bool {
        self.file_preview.is_some()
    }

    /// Clear the selected file and any upload/error state (the "Try Again"
    /// and card "Reset" actions). The job description is kept.
    pub fn reset_form(&mut self) {
        self.selected_file = None;
        self.file_preview = None;
        self.upload = UploadState::Idle;
        self.error = None;
    }

    /// Return from the results dashboard to an empty form.
    ///
    /// The job description is preserved so the user can screen another
    /// resume against the same posting.
    pub fn reset_to_collecting(&mut self) {
        self.reset_form();
        self.results = None;
        self.phase = PhaseProgress::default();
        self.view = View::Collecting;
    }
}
