//! Local input checks that run before any network call.

use crate::models::{DocumentKind, FilePreview, MIN_JOB_DESCRIPTION_CHARS};
use crate::services::api::ErrorCategory;
use camino::Utf8Path;
use std::fs;
use thiserror::Error;

/// Reasons a submission is refused before it reaches the backend.
///
/// The `Display` text is what the user sees in the error banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "Please enter a detailed job description (at least {} characters).",
        MIN_JOB_DESCRIPTION_CHARS
    )]
    DescriptionTooShort,

    #[error("Please upload a resume file (PDF or DOCX).")]
    MissingFile,

    #[error("Invalid file type. Please upload a PDF or DOCX file.")]
    InvalidFileType { mime_type: String },

    #[error("Could not find the file to upload. Please try selecting the file again.")]
    FileUnreadable { path: String, detail: String },
}

impl ValidationError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidInput
    }
}

/// Require at least [`MIN_JOB_DESCRIPTION_CHARS`] characters after trimming
pub fn validate_job_description(text: &str) -> Result<(), ValidationError> {
    if text.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooShort);
    }
    Ok(())
}

/// Accept only PDF and DOCX
pub fn validate_file_type(preview: &FilePreview) -> Result<DocumentKind, ValidationError> {
    preview
        .document_kind()
        .ok_or_else(|| ValidationError::InvalidFileType {
            mime_type: preview.mime_type.clone(),
        })
}

/// Full pre-submit check.
///
/// Order: description length, file presence, file type.
pub fn validate(
    file: Option<&FilePreview>,
    job_description: &str,
) -> Result<DocumentKind, ValidationError> {
    validate_job_description(job_description)?;
    let file = file.ok_or(ValidationError::MissingFile)?;
    validate_file_type(file)
}

/// Stat a candidate file and build its preview, refusing unsupported types.
///
/// Used when a file is picked so a bad selection never reaches the form.
pub fn inspect_file(path: &Utf8Path) -> Result<FilePreview, ValidationError> {
    let metadata = fs::metadata(path).map_err(|e| ValidationError::FileUnreadable {
        path: path.to_string(),
        detail: e.to_string(),
    })?;

    if !metadata.is_file() {
        return Err(ValidationError::FileUnreadable {
            path: path.to_string(),
            detail: "not a regular file".to_string(),
        });
    }

    let preview = FilePreview::from_path(path, metadata.len());
    validate_file_type(&preview)?;
    Ok(preview)
}
