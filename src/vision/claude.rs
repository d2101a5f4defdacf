//! Anthropic Claude backend (Messages API)

use super::{
    detect_media_type, encode_image_base64, post_json, VisionClient, MAX_TOKENS_MULTI,
    MAX_TOKENS_SINGLE,
};
use crate::ai_provider::AiProvider;
use crate::error::{CorrosionError, Result};
use async_trait::async_trait;
use corrosion_ai_common::image_label;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER: &str = "Claude";

/// Required version header
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Claude Vision client
#[derive(Debug, Clone)]
pub struct ClaudeVision {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeVision {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: AiProvider::Claude.default_model().to_string(),
            base_url: AiProvider::Claude.default_base_url().to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// API root without the `/v1/messages` path
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn image_block(image: &[u8]) -> ContentBlock {
        ContentBlock::Image {
            source: ImageSource {
                source_type: "base64",
                media_type: detect_media_type(image),
                data: encode_image_base64(image),
            },
        }
    }

    async fn send(&self, content: Vec<ContentBlock>, max_tokens: u32) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature: 0.0,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        debug!(model = %self.model, max_tokens, "sending Claude request");

        let builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);

        let response: MessagesResponse = post_json(PROVIDER, builder, &request).await?;

        response
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| CorrosionError::InvalidResponse {
                provider: PROVIDER.to_string(),
                message: "no text content in response".to_string(),
            })
    }
}

#[async_trait]
impl VisionClient for ClaudeVision {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze_image(&self, image: &[u8], prompt: &str) -> Result<String> {
        let content = vec![
            Self::image_block(image),
            ContentBlock::Text {
                text: prompt.to_string(),
            },
        ];
        self.send(content, MAX_TOKENS_SINGLE).await
    }

    async fn analyze_multiple_images(&self, images: &[&[u8]], prompt: &str) -> Result<String> {
        let mut content = Vec::with_capacity(images.len() * 2 + 1);
        for (idx, image) in images.iter().enumerate() {
            content.push(ContentBlock::Text {
                text: image_label(idx + 1),
            });
            content.push(Self::image_block(image));
        }
        content.push(ContentBlock::Text {
            text: prompt.to_string(),
        });

        self.send(content, MAX_TOKENS_MULTI).await
    }
}
