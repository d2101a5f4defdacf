//! Model response parser
//!
//! Pulls the JSON payload out of free-form model output and maps it onto
//! `AnalysisResult`s. Single-image parsing never fails; comparison parsing
//! returns an error so the caller can fall back to per-image analysis.

use crate::error::{Error, Result};
use crate::ranking::sort_by_rank;
use crate::types::{AnalysisResult, RankedResult, RustGrade, RustPercentage};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Shown when the model output holds no decodable JSON object.
pub const PARSE_FAILURE_MESSAGE: &str =
    "Could not parse the analysis result. Please try again.";

/// Shown when the model judged the subject not to be a metal rod.
pub const NOT_METAL_ROD_MESSAGE: &str =
    "This image does not appear to be a metal rod. Please upload a photo of a metal rod.";

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap();
    static ref BARE_FENCE: Regex = Regex::new(r"(?s)```[ \t]*\r?\n(.*?)\s*```").unwrap();
}

/// Extract the JSON part of a model response.
///
/// Extraction order:
/// 1. a ```json ... ``` block
/// 2. an unlabeled ``` ... ``` block
/// 3. the whole response, trimmed
///
/// # Examples
/// ```
/// use corrosion_ai_common::extract_json;
///
/// let response = "Result:\n```json\n{\"is_metal_rod\": true}\n```";
/// assert_eq!(extract_json(response), "{\"is_metal_rod\": true}");
/// assert_eq!(extract_json("  [1, 2]  "), "[1, 2]");
/// ```
pub fn extract_json(response: &str) -> &str {
    for fence in [&*JSON_FENCE, &*BARE_FENCE] {
        if let Some(inner) = fence.captures(response).and_then(|c| c.get(1)) {
            return inner.as_str();
        }
    }
    response.trim()
}

/// Find the first balanced `{...}` or `[...]` region in `text`.
///
/// Brackets inside JSON strings are ignored. Used as a second attempt when
/// the model wraps an unfenced payload in prose. Linear in the length of
/// `text`: a failed scan reports where it stopped and any balanced region it
/// closed on the way, so no byte is scanned twice.
pub fn find_balanced_json(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = bytes[search_from..]
        .iter()
        .position(|&b| b == b'{' || b == b'[')
    {
        let start = search_from + offset;
        match scan_region(bytes, start) {
            Scan::Closed(end) => return Some(&text[start..=end]),
            Scan::Unclosed {
                inner: Some((inner_start, inner_end)),
                ..
            } => return Some(&text[inner_start..=inner_end]),
            Scan::Unclosed { stopped_at, .. } => {
                if stopped_at >= bytes.len() {
                    return None;
                }
                search_from = stopped_at + 1;
            }
        }
    }

    None
}

/// Outcome of scanning from one opening bracket.
enum Scan {
    /// Index of the bracket that closes the region.
    Closed(usize),
    /// The region never closed. `stopped_at` is the mismatched closer, or
    /// the text length; `inner` is the leftmost nested region that did close.
    Unclosed {
        stopped_at: usize,
        inner: Option<(usize, usize)>,
    },
}

fn scan_region(bytes: &[u8], start: usize) -> Scan {
    // (position, expected closer) of every open bracket
    let mut open: Vec<(usize, u8)> = Vec::new();
    let mut inner: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => open.push((i, b'}')),
            b'[' => open.push((i, b']')),
            b'}' | b']' => match open.pop() {
                Some((_, close)) if close == b && open.is_empty() => return Scan::Closed(i),
                Some((position, close)) if close == b => {
                    if inner.map_or(true, |(s, _)| position < s) {
                        inner = Some((position, i));
                    }
                }
                // every bracket still open would hit this same mismatch
                _ => return Scan::Unclosed { stopped_at: i, inner },
            },
            _ => {}
        }
    }

    Scan::Unclosed {
        stopped_at: bytes.len(),
        inner,
    }
}

/// Decode the JSON payload of a model response.
fn decode_payload(response: &str) -> Result<Value> {
    let candidate = extract_json(response);

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Ok(value),
        Err(first_error) => find_balanced_json(candidate)
            .and_then(|region| serde_json::from_str::<Value>(region).ok())
            .ok_or_else(|| Error::Parse(first_error.to_string())),
    }
}

/// JSON truthiness: absent, null, false, 0, "" and empty containers are false.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Accepts integers and floats (rounded); null or absent is `None`.
fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    match number {
        None => Ok(None),
        Some(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Some(i)),
            (None, Some(f)) if f.is_finite() => Ok(Some(f.round() as i64)),
            _ => Err(de::Error::custom(format!("expected an integer, got {}", n))),
        },
    }
}

/// Per-image fields shared by both response shapes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    #[serde(deserialize_with = "lenient_int")]
    rust_score: Option<i64>,
    rust_grade: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    rust_percentage_min: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    rust_percentage_max: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    confidence_score: Option<i64>,
    color_analysis: Option<String>,
    surface_analysis: Option<String>,
    corrosion_analysis: Option<String>,
    analysis_reason: Option<String>,
}

impl RawAnalysis {
    fn into_result(self, rank: Option<u32>, analysis_reason: Option<String>) -> AnalysisResult {
        AnalysisResult {
            is_metal_rod: true,
            rust_grade: self.rust_grade.map(RustGrade::from),
            rust_percentage: RustPercentage::from_bounds(
                self.rust_percentage_min,
                self.rust_percentage_max,
            ),
            rust_score: self.rust_score,
            confidence_score: self.confidence_score,
            rank,
            analysis_reason,
            color_analysis: self.color_analysis,
            surface_analysis: self.surface_analysis,
            corrosion_analysis: self.corrosion_analysis,
            error_message: None,
        }
    }
}

/// One element of the comparison array.
#[derive(Debug, Deserialize)]
struct RawComparisonEntry {
    #[serde(default, deserialize_with = "lenient_int")]
    image_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    rank: Option<i64>,
    #[serde(default)]
    comparison_note: Option<String>,
    #[serde(flatten)]
    analysis: RawAnalysis,
}

/// Parse a single-image response.
///
/// Never fails: undecodable output and non-rod subjects both come back as
/// `is_metal_rod == false` with an error message.
///
/// # Arguments
/// * `response` - raw model output
///
/// # Returns
/// The parsed `AnalysisResult`
pub fn parse_single_response(response: &str) -> AnalysisResult {
    let value = match decode_payload(response) {
        Ok(value) => value,
        Err(_) => return AnalysisResult::failure(PARSE_FAILURE_MESSAGE),
    };

    let Some(object) = value.as_object() else {
        return AnalysisResult::failure(PARSE_FAILURE_MESSAGE);
    };

    if !is_truthy(object.get("is_metal_rod")) {
        return AnalysisResult::failure(NOT_METAL_ROD_MESSAGE);
    }

    match serde_json::from_value::<RawAnalysis>(value) {
        Ok(raw) => {
            let reason = raw.analysis_reason.clone();
            raw.into_result(None, reason)
        }
        Err(_) => AnalysisResult::failure(PARSE_FAILURE_MESSAGE),
    }
}

/// Parse a joint comparison response.
///
/// Entries are matched to `image_ids` through their 1-based `image_index`;
/// out-of-range entries are dropped. The output is sorted by rank, entries
/// without a rank last.
///
/// # Arguments
/// * `response` - raw model output
/// * `image_ids` - identifiers of the submitted images, in submission order
///
/// # Returns
/// * `Ok(Vec<RankedResult>)` - ranked results
/// * `Err(Error::Parse)` - no decodable JSON
/// * `Err(Error::Structure)` - JSON of the wrong shape
pub fn parse_multi_response<S: AsRef<str>>(
    response: &str,
    image_ids: &[S],
) -> Result<Vec<RankedResult>> {
    let value = decode_payload(response)?;

    let Value::Array(entries) = value else {
        return Err(Error::Structure(format!(
            "expected a JSON array of per-image results, got {}",
            json_type_name(&value)
        )));
    };

    let mut results = Vec::with_capacity(entries.len());

    for (position, entry) in entries.into_iter().enumerate() {
        let entry: RawComparisonEntry = serde_json::from_value(entry)
            .map_err(|e| Error::Structure(format!("entry {}: {}", position, e)))?;

        let image_index = entry.image_index.ok_or_else(|| {
            Error::Structure(format!("entry {} is missing image_index", position))
        })?;

        let Some(id) = image_index
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| image_ids.get(i))
        else {
            continue;
        };

        let reason = combine_reason(
            entry.analysis.analysis_reason.as_deref(),
            entry.comparison_note.as_deref(),
        );
        // ranks are 1-based; 0 or negative counts as unranked
        let rank = entry
            .rank
            .filter(|r| *r >= 1)
            .and_then(|r| u32::try_from(r).ok());

        results.push((id.as_ref().to_string(), entry.analysis.into_result(rank, reason)));
    }

    sort_by_rank(&mut results);
    Ok(results)
}

/// `reason (note)`, or just the reason when the note is empty.
fn combine_reason(reason: Option<&str>, note: Option<&str>) -> Option<String> {
    let reason = reason.unwrap_or_default();
    let combined = match note {
        Some(note) if !note.is_empty() => format!("{} ({})", reason, note),
        _ => reason.to_string(),
    };

    if combined.is_empty() {
        None
    } else {
        Some(combined)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
