use serde::{Deserialize, Serialize};

/// Response body of `POST /upload_resume/`
///
/// The shape is owned by the backend. Fields the client doesn't render
/// (such as `file_saved_at`) are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall resume/job compatibility, 0-100
    pub match_score: f64,

    /// Keyword/skill overlap, 0-100
    pub skill_match_score: f64,

    #[serde(default)]
    pub matched_skills: Vec<String>,

    /// Free-form verdict, e.g. "Suitable" or "Not Suitable"
    pub prediction: String,

    pub bert_classification: BertClassification,
}

/// Label and confidence from the backend's text classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BertClassification {
    pub label: String,

    /// 0.0-1.0. Older backends send this as `score`.
    #[serde(alias = "score")]
    pub confidence: f64,
}

impl AnalysisResult {
    /// Whether the prediction reads as a positive verdict.
    ///
    /// "Not Suitable" contains "suitable", so the negation is checked first.
    pub fn is_suitable(&self) -> bool {
        let prediction = self.prediction.to_lowercase();
        prediction.contains("suitable")
            && !prediction.contains("not suitable")
            && !prediction.contains("unsuitable")
    }
}
