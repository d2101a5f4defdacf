//! corrosion-ai common library
//!
//! I/O-free core shared by the CLI: result types, prompts, model response
//! parsing, batch ranking and error hints.

pub mod error;
pub mod hint;
pub mod parser;
pub mod prompts;
pub mod ranking;
pub mod types;

pub use error::{Error, Result};
pub use hint::ErrorHint;
pub use parser::{
    extract_json, find_balanced_json, parse_multi_response, parse_single_response,
    NOT_METAL_ROD_MESSAGE, PARSE_FAILURE_MESSAGE,
};
pub use prompts::{build_comparison_prompt, image_label, SINGLE_ANALYSIS_PROMPT};
pub use ranking::{assign_fallback_ranks, fallback_sort_key, sort_by_rank, RankBadge};
pub use types::{AnalysisResult, RankedResult, RustGrade, RustPercentage};
