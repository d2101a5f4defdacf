//! Vision model backends
//!
//! - VisionClient: the two operations every backend provides
//! - ClaudeVision: Anthropic Messages API
//! - OpenAiVision: OpenAI Chat Completions API
//!
//! All requests use temperature 0 so repeated calls on the same images stay
//! as reproducible as the provider allows.

mod claude;
mod openai;

pub use claude::ClaudeVision;
pub use openai::OpenAiVision;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{CorrosionError, Result};
use async_trait::async_trait;
use base64::Engine;
use image::ImageFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Token budget for a single-image request
pub const MAX_TOKENS_SINGLE: u32 = 2048;

/// Token budget for a joint comparison request
pub const MAX_TOKENS_MULTI: u32 = 8192;

/// A hosted vision-capable model: images + prompt in, free-form text out.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Provider name used in logs and reports
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Send one image with `prompt`.
    async fn analyze_image(&self, image: &[u8], prompt: &str) -> Result<String>;

    /// Send all `images` in one request, in order, each preceded by its
    /// 1-based label, followed by `prompt`.
    async fn analyze_multiple_images(&self, images: &[&[u8]], prompt: &str) -> Result<String>;
}

/// Standard base64 encoding for request bodies
pub fn encode_image_base64(image: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(image)
}

/// Sniff the media type from the image header; unknown formats are sent as JPEG.
pub fn detect_media_type(image: &[u8]) -> &'static str {
    match image::guess_format(image) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        _ => "image/jpeg",
    }
}

/// Build the backend selected by `provider`.
///
/// # Errors
/// `MissingApiKey` when neither the environment nor the config file holds a key.
pub fn create_client(provider: AiProvider, config: &Config) -> Result<Box<dyn VisionClient>> {
    let api_key = config.get_api_key(provider)?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| CorrosionError::Config(format!("failed to build HTTP client: {}", e)))?;

    let client: Box<dyn VisionClient> = match provider {
        AiProvider::Claude => Box::new(
            ClaudeVision::new(http, api_key)
                .with_model(config.model(provider))
                .with_base_url(config.base_url(provider)),
        ),
        AiProvider::Openai => Box::new(
            OpenAiVision::new(http, api_key)
                .with_model(config.model(provider))
                .with_base_url(config.base_url(provider)),
        ),
    };

    Ok(client)
}

/// POST a JSON body and decode a JSON reply.
///
/// Non-2xx replies keep the provider's body text unmodified so callers can
/// still see phrases like "credit balance" or "rate limit".
async fn post_json<B, R>(provider: &str, request: reqwest::RequestBuilder, body: &B) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| CorrosionError::Connection {
            provider: provider.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| CorrosionError::Connection {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    debug!(provider, status = status.as_u16(), bytes = text.len(), "vision API responded");

    if !status.is_success() {
        return Err(CorrosionError::ApiStatus {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| CorrosionError::InvalidResponse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}
