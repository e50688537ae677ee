//! Data models for the resume screener.
//!
//! This module contains the core data structures used throughout the application:
//! - [`AppState`]: The central state container (form input, view, upload, results)
//! - [`AnalysisResult`]: The backend's analysis response
//! - [`FilePreview`] / [`UploadState`]: Selected-file metadata and upload lifecycle
//! - [`ScreenerConfig`]: User configuration loaded from `Screener Config.yaml`
//!
//! # Architecture Note
//!
//! - **Serializable**: Wire and config structs derive `Serialize`/`Deserialize`
//! - **Cloneable**: AppState is wrapped in `Arc<RwLock<>>` by [`StateManager`](crate::state::StateManager)
//! - **Immutable**: State updates go through StateManager's `update()` method

pub mod analysis;
pub mod app_state;
pub mod config;
pub mod upload;

pub use analysis::{AnalysisResult, BertClassification};
pub use app_state::{AppState, ConnectivityStatus, MIN_JOB_DESCRIPTION_CHARS, PhaseProgress, View};
pub use config::{ApiEnvironment, DEPLOYED_API_URL, LOCAL_API_URL, ScreenerConfig};
pub use upload::{DOCX_MIME, DocumentKind, FilePreview, PDF_MIME, UploadState, mime_type_for_path};
