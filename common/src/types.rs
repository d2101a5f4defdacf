//! Analysis result types
//!
//! Shared between the parser, the ranking logic and the CLI report:
//! - RustGrade: the four-bucket severity label
//! - RustPercentage: rust coverage band reported by the model
//! - AnalysisResult: one judgment about one image
//! - RankedResult: (image identifier, result) pair of a batch

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rust severity bucket.
///
/// The model is asked for the Korean labels (정상/경미/보통/심각) but the English
/// names are accepted as well. Any other label is kept verbatim in
/// `Unrecognized` rather than being coerced into one of the four buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RustGrade {
    Normal,
    Mild,
    Moderate,
    Severe,
    Unrecognized(String),
}

impl RustGrade {
    /// Map a model-supplied label onto a grade.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "정상" | "Normal" | "normal" => RustGrade::Normal,
            "경미" | "Mild" | "mild" => RustGrade::Mild,
            "보통" | "Moderate" | "moderate" => RustGrade::Moderate,
            "심각" | "Severe" | "severe" => RustGrade::Severe,
            _ => RustGrade::Unrecognized(label.to_string()),
        }
    }

    /// English display name. Unrecognized labels are shown as received.
    pub fn display_name(&self) -> &str {
        match self {
            RustGrade::Normal => "Normal",
            RustGrade::Mild => "Mild",
            RustGrade::Moderate => "Moderate",
            RustGrade::Severe => "Severe",
            RustGrade::Unrecognized(label) => label,
        }
    }

    /// Colored marker used in terminal output.
    pub fn emoji(&self) -> &'static str {
        match self {
            RustGrade::Normal => "🟢",
            RustGrade::Mild => "🟡",
            RustGrade::Moderate => "🟠",
            RustGrade::Severe => "🔴",
            RustGrade::Unrecognized(_) => "⚪",
        }
    }
}

impl From<String> for RustGrade {
    fn from(label: String) -> Self {
        RustGrade::from_label(&label)
    }
}

impl From<RustGrade> for String {
    fn from(grade: RustGrade) -> Self {
        match grade {
            RustGrade::Unrecognized(label) => label,
            other => other.display_name().to_string(),
        }
    }
}

impl fmt::Display for RustGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Rust coverage band, e.g. 10~30%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RustPercentage {
    pub min: i64,
    pub max: i64,
}

impl RustPercentage {
    /// Both bounds are required; a half-open band is not displayed.
    pub fn from_bounds(min: Option<i64>, max: Option<i64>) -> Option<Self> {
        match (min, max) {
            (Some(min), Some(max)) => Some(Self { min, max }),
            _ => None,
        }
    }
}

impl fmt::Display for RustPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}%", self.min, self.max)
    }
}

/// Rust analysis of a single image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// False when the subject was not judged to be a metal rod; only
    /// `error_message` is meaningful then.
    pub is_metal_rod: bool,

    #[serde(default)]
    pub rust_grade: Option<RustGrade>,

    #[serde(default)]
    pub rust_percentage: Option<RustPercentage>,

    /// 0-100, higher means more rust
    #[serde(default)]
    pub rust_score: Option<i64>,

    /// 1-100
    #[serde(default)]
    pub confidence_score: Option<i64>,

    /// 1-based position within a batch, 1 = most rusted
    #[serde(default)]
    pub rank: Option<u32>,

    #[serde(default)]
    pub analysis_reason: Option<String>,

    #[serde(default)]
    pub color_analysis: Option<String>,

    #[serde(default)]
    pub surface_analysis: Option<String>,

    #[serde(default)]
    pub corrosion_analysis: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,
}

impl AnalysisResult {
    /// Result for an image that could not be judged.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_metal_rod: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// One entry of a ranked batch: (image identifier, result)
pub type RankedResult = (String, AnalysisResult);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_from_korean_labels() {
        assert_eq!(RustGrade::from_label("정상"), RustGrade::Normal);
        assert_eq!(RustGrade::from_label("경미"), RustGrade::Mild);
        assert_eq!(RustGrade::from_label("보통"), RustGrade::Moderate);
        assert_eq!(RustGrade::from_label("심각"), RustGrade::Severe);
    }

    #[test]
    fn test_grade_from_english_labels() {
        assert_eq!(RustGrade::from_label("Severe"), RustGrade::Severe);
        assert_eq!(RustGrade::from_label(" mild "), RustGrade::Mild);
    }

    #[test]
    fn test_unknown_grade_is_kept_verbatim() {
        let grade = RustGrade::from_label("약간 심각");
        assert_eq!(grade, RustGrade::Unrecognized("약간 심각".to_string()));
        assert_eq!(grade.display_name(), "약간 심각");
        assert_eq!(grade.emoji(), "⚪");
    }

    #[test]
    fn test_grade_serializes_as_string() {
        let json = serde_json::to_string(&RustGrade::Moderate).unwrap();
        assert_eq!(json, "\"Moderate\"");

        let grade: RustGrade = serde_json::from_str("\"심각\"").unwrap();
        assert_eq!(grade, RustGrade::Severe);
    }

    #[test]
    fn test_percentage_display() {
        let band = RustPercentage { min: 10, max: 30 };
        assert_eq!(band.to_string(), "10~30%");
    }

    #[test]
    fn test_percentage_requires_both_bounds() {
        assert_eq!(RustPercentage::from_bounds(Some(10), None), None);
        assert_eq!(RustPercentage::from_bounds(None, Some(30)), None);
        assert_eq!(
            RustPercentage::from_bounds(Some(70), Some(100)),
            Some(RustPercentage { min: 70, max: 100 })
        );
    }

    #[test]
    fn test_failure_result() {
        let result = AnalysisResult::failure("rate limit exceeded");
        assert!(!result.is_metal_rod);
        assert_eq!(result.error_message.as_deref(), Some("rate limit exceeded"));
        assert_eq!(result.rust_grade, None);
        assert_eq!(result.rust_score, None);
        assert_eq!(result.rank, None);
    }

    #[test]
    fn test_analysis_result_serialize() {
        let result = AnalysisResult {
            is_metal_rod: true,
            rust_grade: Some(RustGrade::Severe),
            rust_score: Some(85),
            rank: Some(1),
            ..Default::default()
        };

        let json = serde_json::to_string(&result).expect("serialize failed");
        assert!(json.contains("\"isMetalRod\":true"));
        assert!(json.contains("\"rustGrade\":\"Severe\""));
        assert!(json.contains("\"rustScore\":85"));
        assert!(json.contains("\"rank\":1"));
    }
}
