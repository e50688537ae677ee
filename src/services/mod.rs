//! Services module - Business logic for talking to the screening backend.
//!
//! The services are **framework-agnostic** and have no dependencies on the UI layer,
//! making them testable and reusable.
//!
//! # Components
//!
//! - [`ScreeningApi`]: The backend seam. [`HttpScreeningApi`] implements it over reqwest:
//!   - `GET /health` for the connectivity probe
//!   - `POST /upload_resume/` multipart upload with streamed progress and cancellation
//!
//! - [`ProgressTracker`]: Monotonic upload percentage, held below 100 until the
//!   response has been parsed
//!
//! - [`validation`]: Local checks (description length, file presence, PDF/DOCX type)
//!   that run before any request is made
//!
//! - [`PhaseTicker`]: Timer-driven "analysis phase" animation shown during an upload
//!
//! - [`ConnectivityProber`]: Runs the health probe and reflects it in app state
//!
//! # Errors
//!
//! Each failure type ([`ValidationError`], [`UploadError`], [`ProbeError`]) renders the
//! user-facing banner text through `Display` and maps to an [`ErrorCategory`] for
//! logging and metrics.
//!
//! # Usage Example
//!
//! ```ignore
//! use resume_screener::services::{HttpScreeningApi, ProgressTracker, ScreeningApi, UploadRequest};
//!
//! let api = HttpScreeningApi::new(&config)?;
//! let progress = ProgressTracker::new();
//! let result = api.upload_resume(request, progress, CancellationToken::new()).await?;
//! println!("match: {}%", result.match_score);
//! ```

pub mod api;
pub mod connectivity;
pub mod phases;
pub mod progress;
pub mod validation;

pub use api::{
    ErrorCategory, HttpScreeningApi, ProbeError, ScreeningApi, UploadError, UploadRequest,
};
pub use connectivity::ConnectivityProber;
pub use phases::{ANALYSIS_PHASES, PhaseTicker, phase_hint, phase_label};
pub use progress::ProgressTracker;
pub use validation::ValidationError;
