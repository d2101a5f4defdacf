//! Ranking and fallback tests against a scripted vision client

use async_trait::async_trait;
use corrosion_ai::analyzer::{ImageInput, RustAnalyzer};
use corrosion_ai::error::{CorrosionError, Result};
use corrosion_ai::vision::VisionClient;
use corrosion_ai_common::{RustGrade, NOT_METAL_ROD_MESSAGE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// (images, prompt) of one joint request
type JointRequest = (Vec<Vec<u8>>, String);

/// Per-image replies keyed by image bytes; `None` simulates a transport error.
#[derive(Default)]
struct ScriptedClient {
    single: HashMap<Vec<u8>, Option<String>>,
    joint: Option<String>,
    single_calls: Arc<AtomicUsize>,
    joint_calls: Arc<AtomicUsize>,
    joint_requests: Arc<Mutex<Vec<JointRequest>>>,
}

impl ScriptedClient {
    fn single(mut self, image: &[u8], reply: Option<&str>) -> Self {
        self.single.insert(image.to_vec(), reply.map(str::to_string));
        self
    }

    fn joint(mut self, reply: &str) -> Self {
        self.joint = Some(reply.to_string());
        self
    }

    fn joint_log(&self) -> Arc<Mutex<Vec<JointRequest>>> {
        self.joint_requests.clone()
    }

    fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.single_calls.clone(), self.joint_calls.clone())
    }
}

fn transport_error() -> CorrosionError {
    CorrosionError::Connection {
        provider: "Scripted".to_string(),
        message: "connection reset".to_string(),
    }
}

#[async_trait]
impl VisionClient for ScriptedClient {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn analyze_image(&self, image: &[u8], _prompt: &str) -> Result<String> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.single
            .get(image)
            .cloned()
            .flatten()
            .ok_or_else(transport_error)
    }

    async fn analyze_multiple_images(&self, images: &[&[u8]], prompt: &str) -> Result<String> {
        self.joint_calls.fetch_add(1, Ordering::SeqCst);
        self.joint_requests.lock().unwrap().push((
            images.iter().map(|image| image.to_vec()).collect(),
            prompt.to_string(),
        ));
        self.joint.clone().ok_or_else(transport_error)
    }
}

fn rod_reply(score: i64, grade: &str) -> String {
    format!(
        r#"```json
{{"is_metal_rod": true, "rust_score": {score}, "rust_grade": "{grade}", "rust_percentage_min": 10, "rust_percentage_max": 30, "confidence_score": 80, "analysis_reason": "score {score}"}}
```"#
    )
}

const NOT_ROD_REPLY: &str = r#"{"is_metal_rod": false, "analysis_reason": "this is a cat"}"#;

fn inputs(ids: &[&str]) -> Vec<ImageInput> {
    ids.iter()
        .map(|id| (id.to_string(), id.as_bytes().to_vec()))
        .collect()
}

fn order(results: &[(String, corrosion_ai_common::AnalysisResult)]) -> Vec<(&str, Option<u32>)> {
    results.iter().map(|(id, r)| (id.as_str(), r.rank)).collect()
}

#[tokio::test]
async fn test_single_image_fenced_json() {
    let client = ScriptedClient::default().single(b"rod1", Some(&rod_reply(85, "심각")));
    let analyzer = RustAnalyzer::new(Box::new(client));

    let result = analyzer.analyze(b"rod1").await;

    assert!(result.is_metal_rod);
    assert_eq!(result.rust_grade, Some(RustGrade::Severe));
    assert_eq!(result.rust_score, Some(85));
    assert_eq!(result.rank, None);
}

#[tokio::test]
async fn test_joint_ranking_follows_model_ranks() {
    let joint = r#"[
        {"image_index": 1, "rank": 2, "rust_score": 50, "rust_grade": "보통", "comparison_note": "middle"},
        {"image_index": 2, "rank": 1, "rust_score": 90, "rust_grade": "심각"},
        {"image_index": 3, "rank": 3, "rust_score": 5, "rust_grade": "정상"}
    ]"#;
    let client = ScriptedClient::default().joint(joint);
    let (single_calls, joint_calls) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["a", "b", "c"])).await;

    assert_eq!(order(&results), vec![("b", Some(1)), ("a", Some(2)), ("c", Some(3))]);
    assert!(results.iter().all(|(_, r)| r.is_metal_rod));
    assert_eq!(results[0].1.rust_grade, Some(RustGrade::Severe));
    assert_eq!(joint_calls.load(Ordering::SeqCst), 1);
    assert_eq!(single_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_joint_request_keeps_submission_order() {
    let joint = r#"[{"image_index": 1, "rank": 1}, {"image_index": 2, "rank": 2}, {"image_index": 3, "rank": 3}]"#;
    let client = ScriptedClient::default().joint(joint);
    let log = client.joint_log();
    let analyzer = RustAnalyzer::new(Box::new(client));

    analyzer.analyze_multiple(&inputs(&["a", "b", "c"])).await;

    let requests = log.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (images, prompt) = &requests[0];
    assert_eq!(images, &vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    assert!(prompt.contains("3장의"));
}

#[tokio::test]
async fn test_transport_error_falls_back_to_individual() {
    let client = ScriptedClient::default()
        .single(b"a", Some(&rod_reply(40, "보통")))
        .single(b"b", Some(&rod_reply(70, "심각")))
        .single(b"c", Some(&rod_reply(40, "경미")));
    let (single_calls, joint_calls) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["a", "b", "c"])).await;

    // ties keep submission order
    assert_eq!(order(&results), vec![("b", Some(1)), ("a", Some(2)), ("c", Some(3))]);
    assert_eq!(joint_calls.load(Ordering::SeqCst), 1);
    assert_eq!(single_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unparseable_joint_reply_falls_back() {
    let client = ScriptedClient::default()
        .joint("I cannot compare these images.")
        .single(b"a", Some(&rod_reply(10, "정상")))
        .single(b"b", Some(&rod_reply(60, "보통")));
    let (single_calls, _) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["a", "b"])).await;

    assert_eq!(order(&results), vec![("b", Some(1)), ("a", Some(2))]);
    assert_eq!(single_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_object_instead_of_array_falls_back() {
    let client = ScriptedClient::default()
        .joint(r#"{"rank": 1, "image_index": 1}"#)
        .single(b"a", Some(&rod_reply(10, "정상")))
        .single(b"b", Some(&rod_reply(20, "경미")));
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["a", "b"])).await;

    assert_eq!(order(&results), vec![("b", Some(1)), ("a", Some(2))]);
}

#[tokio::test]
async fn test_missing_image_index_falls_back() {
    let client = ScriptedClient::default()
        .joint(r#"[{"rank": 1, "rust_score": 90}, {"image_index": 2, "rank": 2}]"#)
        .single(b"a", Some(&rod_reply(30, "경미")))
        .single(b"b", Some(&rod_reply(80, "심각")));
    let (single_calls, _) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["a", "b"])).await;

    assert_eq!(single_calls.load(Ordering::SeqCst), 2);
    assert_eq!(order(&results), vec![("b", Some(1)), ("a", Some(2))]);
}

#[tokio::test]
async fn test_fallback_puts_non_rod_last() {
    let client = ScriptedClient::default()
        .single(b"cat", Some(NOT_ROD_REPLY))
        .single(b"a", Some(&rod_reply(0, "정상")))
        .single(b"b", None);
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["cat", "a", "b"])).await;

    // a scored 0 still outranks the non-rod and failed images
    assert_eq!(order(&results), vec![("a", Some(1)), ("cat", Some(2)), ("b", Some(3))]);
    assert!(!results[1].1.is_metal_rod);
    let failed = &results[2].1;
    assert!(!failed.is_metal_rod);
    assert!(failed
        .error_message
        .as_deref()
        .is_some_and(|m| m.starts_with("Analysis error:") && m.contains("connection reset")));
}

#[tokio::test]
async fn test_fallback_is_deterministic() {
    let build = || {
        ScriptedClient::default()
            .single(b"a", Some(&rod_reply(50, "보통")))
            .single(b"b", Some(&rod_reply(50, "보통")))
            .single(b"c", Some(&rod_reply(75, "심각")))
            .single(b"d", Some(NOT_ROD_REPLY))
    };
    let images = inputs(&["a", "b", "c", "d"]);

    let first = RustAnalyzer::new(Box::new(build()))
        .fallback_individual(&images, "test")
        .await;
    let second = RustAnalyzer::new(Box::new(build()))
        .fallback_individual(&images, "test")
        .await;

    assert_eq!(first, second);
    assert_eq!(
        order(&first),
        vec![("c", Some(1)), ("a", Some(2)), ("b", Some(3)), ("d", Some(4))]
    );
}

#[tokio::test]
async fn test_not_metal_rod_single() {
    let client = ScriptedClient::default().single(b"cat", Some(NOT_ROD_REPLY));
    let analyzer = RustAnalyzer::new(Box::new(client));

    let result = analyzer.analyze(b"cat").await;

    assert!(!result.is_metal_rod);
    assert_eq!(result.error_message.as_deref(), Some(NOT_METAL_ROD_MESSAGE));
    assert_eq!(result.rust_score, None);
    assert_eq!(result.rust_grade, None);
    assert_eq!(result.rust_percentage, None);
    assert_eq!(result.confidence_score, None);
}

#[tokio::test]
async fn test_one_image_skips_joint_call() {
    let client = ScriptedClient::default().single(b"only", Some(&rod_reply(20, "경미")));
    let (single_calls, joint_calls) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["only"])).await;

    assert_eq!(order(&results), vec![("only", Some(1))]);
    assert_eq!(results[0].1.rust_grade, Some(RustGrade::Mild));
    assert_eq!(joint_calls.load(Ordering::SeqCst), 0);
    assert_eq!(single_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_images_makes_no_calls() {
    let client = ScriptedClient::default();
    let (single_calls, joint_calls) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&[]).await;

    assert!(results.is_empty());
    assert_eq!(joint_calls.load(Ordering::SeqCst), 0);
    assert_eq!(single_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_out_of_range_entries_are_dropped() {
    let joint = r#"[
        {"image_index": 2, "rank": 1, "rust_score": 60},
        {"image_index": 7, "rank": 2, "rust_score": 50},
        {"image_index": 1, "rank": 3, "rust_score": 10}
    ]"#;
    let client = ScriptedClient::default().joint(joint);
    let (single_calls, _) = client.counters();
    let analyzer = RustAnalyzer::new(Box::new(client));

    let results = analyzer.analyze_multiple(&inputs(&["a", "b"])).await;

    assert_eq!(order(&results), vec![("b", Some(1)), ("a", Some(3))]);
    assert_eq!(single_calls.load(Ordering::SeqCst), 0);
}
