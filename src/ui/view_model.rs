// View models - display-ready data derived from app state
//
// Everything here is plain data so it can be built on a tokio thread and
// handed to the Slint event loop through the bridge.

use crate::models::{AnalysisResult, AppState, ConnectivityStatus, FilePreview};
use crate::services::{phase_hint, phase_label};

/// Colour band for a score bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn for_percent(percent: i32) -> Self {
        match percent {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }

    /// Index used by the Slint palette
    pub fn index(self) -> i32 {
        match self {
            ScoreBand::Excellent => 0,
            ScoreBand::Good => 1,
            ScoreBand::Fair => 2,
            ScoreBand::Poor => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn for_percent(percent: i32) -> Self {
        match percent {
            70.. => ConfidenceLevel::High,
            50..=69 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }

    pub fn index(self) -> i32 {
        match self {
            ConfidenceLevel::High => 0,
            ConfidenceLevel::Medium => 1,
            ConfidenceLevel::Low => 2,
        }
    }
}

/// Round to a whole percentage and clamp to 0-100. Non-finite input is 0.
pub fn rounded_percent(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as i32
}

/// Everything the results dashboard renders
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub match_percent: i32,
    pub skill_percent: i32,
    pub confidence_percent: i32,
    pub match_band: ScoreBand,
    pub skill_band: ScoreBand,
    pub headline: &'static str,
    pub headline_detail: &'static str,
    pub skills: Vec<String>,
    pub skills_summary: String,
    /// Suggestion shown when nothing matched
    pub skills_hint: &'static str,
    pub suitable: bool,
    pub prediction_title: &'static str,
    pub prediction_badge: &'static str,
    pub prediction_text: String,
    pub prediction_detail: &'static str,
    pub classification_label: String,
    pub confidence_level: ConfidenceLevel,
}

impl From<&AnalysisResult> for ResultsView {
    fn from(result: &AnalysisResult) -> Self {
        let match_percent = rounded_percent(result.match_score);
        let skill_percent = rounded_percent(result.skill_match_score);
        let confidence_percent = rounded_percent(result.bert_classification.confidence * 100.0);

        let (headline, headline_detail) = match match_percent {
            70.. => (
                "Strong Match",
                "Your resume aligns well with this position. You have many of the skills and experience the employer is looking for.",
            ),
            50..=69 => (
                "Moderate Match",
                "Your resume partially matches this position. Consider highlighting relevant experience more prominently.",
            ),
            _ => (
                "Potential Match",
                "Your resume shows some alignment, but there may be gaps. Consider tailoring your resume to this role.",
            ),
        };

        let (skills_summary, skills_hint) = match result.matched_skills.len() {
            0 => (
                "No matching skills found on your resume".to_string(),
                "Consider adding skills from the job description that you have experience with.",
            ),
            n => (format!("Found {n} matching skills on your resume"), ""),
        };

        let suitable = result.is_suitable();
        let (prediction_title, prediction_badge, prediction_detail) = if suitable {
            (
                "Suitable Candidate",
                "Recommended",
                "Based on our analysis, your profile fits the requirements of this role.",
            )
        } else {
            (
                "Not Suitable",
                "Not Recommended",
                "Based on our analysis, your profile may not fully meet the requirements of this role.",
            )
        };

        Self {
            match_percent,
            skill_percent,
            confidence_percent,
            match_band: ScoreBand::for_percent(match_percent),
            skill_band: ScoreBand::for_percent(skill_percent),
            headline,
            headline_detail,
            skills: result.matched_skills.clone(),
            skills_summary,
            skills_hint,
            suitable,
            prediction_title,
            prediction_badge,
            prediction_text: result.prediction.clone(),
            prediction_detail,
            classification_label: result.bert_classification.label.clone(),
            confidence_level: ConfidenceLevel::for_percent(confidence_percent),
        }
    }
}

/// Selected-file card
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileCardView {
    pub name: String,
    pub size_label: String,
    pub kind_label: String,
}

impl From<&FilePreview> for FileCardView {
    fn from(preview: &FilePreview) -> Self {
        Self {
            name: preview.name.clone(),
            size_label: preview.size_label(),
            kind_label: preview.kind_label().to_string(),
        }
    }
}

/// Status line next to the "Test Connection" button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityView {
    pub text: String,
    pub reachable: bool,
    pub checking: bool,
}

impl ConnectivityView {
    pub fn new(status: &ConnectivityStatus, base_url: &str) -> Self {
        match status {
            ConnectivityStatus::Unknown => Self {
                text: format!("Backend: {base_url}"),
                reachable: false,
                checking: false,
            },
            ConnectivityStatus::Checking => Self {
                text: "Checking connection...".to_string(),
                reachable: false,
                checking: true,
            },
            ConnectivityStatus::Reachable => Self {
                text: format!("Connected to {base_url}"),
                reachable: true,
                checking: false,
            },
            ConnectivityStatus::Unreachable { .. } => Self {
                text: format!("Cannot reach {base_url}"),
                reachable: false,
                checking: false,
            },
        }
    }
}

/// Uploading view: real progress plus the decorative phase list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadingView {
    pub upload_percent: i32,
    pub phase_percent: i32,
    pub phase_step: i32,
    pub phase_label: &'static str,
    pub phase_hint: &'static str,
}

impl From<&AppState> for UploadingView {
    fn from(state: &AppState) -> Self {
        Self {
            upload_percent: state.upload.percent() as i32,
            phase_percent: state.phase.percent as i32,
            phase_step: state.phase.step as i32,
            phase_label: phase_label(state.phase.step),
            phase_hint: phase_hint(state.phase.percent),
        }
    }
}
