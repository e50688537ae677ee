use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// MIME type sent for PDF resumes
pub const PDF_MIME: &str = "application/pdf";

/// MIME type sent for Word (OOXML) resumes
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Fallback MIME type for extensions we don't recognise
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Resume document formats accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Classify a MIME type, returning `None` for anything other than PDF/DOCX
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }
}

/// Derive a MIME type from a file extension (case-insensitive).
///
/// This is the same information a browser file input exposes, so the
/// client can validate without sniffing file contents.
pub fn mime_type_for_path(path: &Utf8Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => PDF_MIME,
        "docx" => DOCX_MIME,
        "doc" => "application/msword",
        "txt" => "text/plain",
        _ => OCTET_STREAM_MIME,
    }
}

/// Metadata shown on the selected-file card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePreview {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FilePreview {
    /// Build a preview from a path and its size on disk
    pub fn from_path(path: &Utf8Path, size: u64) -> Self {
        Self {
            name: path.file_name().unwrap_or(path.as_str()).to_string(),
            size,
            mime_type: mime_type_for_path(path).to_string(),
        }
    }

    pub fn document_kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_mime(&self.mime_type)
    }

    /// Size in kilobytes with two decimals, e.g. "50.00 KB"
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }

    /// Short badge text for the preview card
    pub fn kind_label(&self) -> &'static str {
        if self.mime_type.contains("pdf") {
            "PDF"
        } else {
            "DOCX"
        }
    }
}

/// Lifecycle of a single upload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading {
        percent: u8,
    },
    Success,
    Error {
        message: String,
    },
}

impl UploadState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }

    /// Percentage to draw on the progress bar
    pub fn percent(&self) -> u8 {
        match self {
            Self::Uploading { percent } => *percent,
            Self::Success => 100,
            Self::Idle | Self::Error { .. } => 0,
        }
    }
}
