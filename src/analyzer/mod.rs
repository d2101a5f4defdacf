//! Rust severity analysis
//!
//! - analyze: one image, one request, never fails
//! - analyze_multiple: joint comparison of a batch, falling back to
//!   independent per-image analysis when the joint request or its parsing fails
//!
//! Requests are issued one at a time, in submission order.

use crate::error::CorrosionError;
use crate::vision::VisionClient;
use corrosion_ai_common::{
    assign_fallback_ranks, build_comparison_prompt, parse_multi_response,
    parse_single_response, AnalysisResult, RankedResult, SINGLE_ANALYSIS_PROMPT,
};
use tracing::{debug, info, warn};

/// An image submitted for analysis: (identifier, raw bytes)
pub type ImageInput = (String, Vec<u8>);

pub struct RustAnalyzer {
    client: Box<dyn VisionClient>,
}

impl RustAnalyzer {
    pub fn new(client: Box<dyn VisionClient>) -> Self {
        Self { client }
    }

    /// Analyze a single image.
    ///
    /// Transport errors come back as a non-rod result whose message holds the
    /// error text unmodified.
    pub async fn analyze(&self, image: &[u8]) -> AnalysisResult {
        match self.client.analyze_image(image, SINGLE_ANALYSIS_PROMPT).await {
            Ok(response) => {
                debug!(chars = response.len(), "single analysis response received");
                parse_single_response(&response)
            }
            Err(e) => {
                warn!(error = %e, "single image analysis failed");
                AnalysisResult::failure(format!("Analysis error: {}", e))
            }
        }
    }

    /// Rank a batch of images by rust severity, most rusted first.
    ///
    /// One image is analyzed on its own and gets rank 1. Larger batches are
    /// compared in a single request; if that request fails or its answer
    /// cannot be parsed, every image is analyzed independently and ranked by
    /// score instead. Never returns an error.
    ///
    /// # Arguments
    /// * `images` - (identifier, bytes) in submission order
    ///
    /// # Returns
    /// (identifier, result) pairs sorted by rank
    pub async fn analyze_multiple(&self, images: &[ImageInput]) -> Vec<RankedResult> {
        match images {
            [] => Vec::new(),
            [(id, image)] => {
                let mut result = self.analyze(image).await;
                result.rank = Some(1);
                vec![(id.clone(), result)]
            }
            _ => match self.compare(images).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, "joint comparison failed, falling back to individual analysis");
                    self.fallback_individual(images, &e.to_string()).await
                }
            },
        }
    }

    /// One joint request for the whole batch.
    async fn compare(&self, images: &[ImageInput]) -> Result<Vec<RankedResult>, CorrosionError> {
        let prompt = build_comparison_prompt(images.len());
        let image_data: Vec<&[u8]> = images.iter().map(|(_, data)| data.as_slice()).collect();
        let ids: Vec<&str> = images.iter().map(|(id, _)| id.as_str()).collect();

        info!(count = images.len(), "comparing images in one request");
        let response = self
            .client
            .analyze_multiple_images(&image_data, &prompt)
            .await?;
        debug!(chars = response.len(), "comparison response received");

        Ok(parse_multi_response(&response, &ids)?)
    }

    /// Analyze each image independently and rank by rust score.
    ///
    /// Non-rod images rank last; ties keep submission order. A failure on one
    /// image only affects that image's result.
    ///
    /// # Arguments
    /// * `images` - (identifier, bytes) in submission order
    /// * `reason` - why the joint comparison was abandoned, for the log
    pub async fn fallback_individual(&self, images: &[ImageInput], reason: &str) -> Vec<RankedResult> {
        info!(count = images.len(), reason, "analyzing images individually");

        let mut results = Vec::with_capacity(images.len());
        for (idx, (id, image)) in images.iter().enumerate() {
            debug!(image = %id, position = idx + 1, "individual analysis");
            let result = self.analyze(image).await;
            results.push((id.clone(), result));
        }

        assign_fallback_ranks(results)
    }
}
