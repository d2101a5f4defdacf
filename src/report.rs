//! Terminal output and JSON report

use crate::error::Result;
use chrono::Local;
use corrosion_ai_common::{AnalysisResult, ErrorHint, RankBadge, RankedResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON report written by `analyze --output`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub provider: String,
    pub model: String,
    pub analyzed_at: String,
    pub results: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub image: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

impl AnalysisReport {
    pub fn new(provider: &str, model: &str, results: &[RankedResult]) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            analyzed_at: Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            results: results
                .iter()
                .map(|(image, result)| ReportEntry {
                    image: image.clone(),
                    result: result.clone(),
                })
                .collect(),
        }
    }
}

pub fn write_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Render one result. `total` is the batch size; rank badges only appear
/// when it is greater than 1.
pub fn render_result(image: &str, result: &AnalysisResult, total: usize) -> String {
    let mut out = String::new();

    let rank = result.rank.filter(|_| total > 1);
    match rank {
        Some(rank) => out.push_str(&format!("── #{} {} ──\n", rank, image)),
        None => out.push_str(&format!("── {} ──\n", image)),
    }

    if !result.is_metal_rod {
        let message = result
            .error_message
            .as_deref()
            .unwrap_or("This image does not appear to be a metal rod.");
        let hint = ErrorHint::classify(message);
        match hint.remedy() {
            Some(remedy) => {
                out.push_str(&format!("❌ {}\n", hint.title()));
                out.push_str(&format!("   {}\n", message));
                out.push_str(&format!("   Hint: {}\n", remedy));
            }
            None => out.push_str(&format!("❌ {}\n", message)),
        }
        return out;
    }

    if let Some(rank) = rank {
        let badge = RankBadge::for_rank(rank, total);
        if !matches!(badge, RankBadge::Position(_)) {
            out.push_str(&format!("{}\n", badge));
        }
    }

    let grade = result
        .rust_grade
        .as_ref()
        .map(|g| format!("{} {}", g.emoji(), g))
        .unwrap_or_else(|| "⚪ -".to_string());
    out.push_str(&format!("Grade:      {}\n", grade));

    let coverage = result
        .rust_percentage
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("Coverage:   {}\n", coverage));

    if let Some(score) = result.rust_score {
        out.push_str(&format!("Score:      {} / 100 (higher = more rust)\n", score));
    }
    if let Some(confidence) = result.confidence_score {
        out.push_str(&format!("Confidence: {}%\n", confidence));
    }

    let details = [
        ("🎨 Color", &result.color_analysis),
        ("✨ Surface", &result.surface_analysis),
        ("🔧 Corrosion", &result.corrosion_analysis),
        ("💡 Summary", &result.analysis_reason),
    ];
    for (label, text) in details {
        if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("  {}: {}\n", label, text));
        }
    }

    out
}

pub fn print_results(results: &[RankedResult]) {
    let total = results.len();
    for (image, result) in results {
        println!("{}", render_result(image, result, total));
    }
}
