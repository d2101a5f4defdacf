//! OpenAI GPT-4o backend (Chat Completions API)

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

const PROVIDER: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// GPT-4o Vision client
#[derive(Debug, Clone)]
pub struct OpenAiVision {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiVision {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: AiProvider::Openai.default_model().to_string(),
            base_url: AiProvider::Openai.default_base_url().to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// API root without the `/v1/chat/completions` path
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Images travel as `data:` URLs
    fn image_part(image: &[u8]) -> ContentPart {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!(
                    "data:{};base64,{}",
                    detect_media_type(image),
                    encode_image_base64(image)
                ),
            },
        }
    }

    async fn send(&self, content: Vec<ContentPart>, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        };

        debug!(model = %self.model, max_tokens, "sending OpenAI request");

        let builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key);

        let response: ChatResponse = post_json(PROVIDER, builder, &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CorrosionError::InvalidResponse {
                provider: PROVIDER.to_string(),
                message: "no message content in response".to_string(),
            })
    }
}

#[async_trait]
impl VisionClient for OpenAiVision {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze_image(&self, image: &[u8], prompt: &str) -> Result<String> {
        let content = vec![
            Self::image_part(image),
            ContentPart::Text {
                text: prompt.to_string(),
            },
        ];
        self.send(content, MAX_TOKENS_SINGLE).await
    }

    async fn analyze_multiple_images(&self, images: &[&[u8]], prompt: &str) -> Result<String> {
        let mut content = Vec::with_capacity(images.len() * 2 + 1);
        for (idx, image) in images.iter().enumerate() {
            content.push(ContentPart::Text {
                text: image_label(idx + 1),
            });
            content.push(Self::image_part(image));
        }
        content.push(ContentPart::Text {
            text: prompt.to_string(),
        });

        self.send(content, MAX_TOKENS_MULTI).await
    }
}
