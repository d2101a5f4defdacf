use crate::ai_provider::AiProvider;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrosionError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No API key configured for {provider}. Set {env_var} or run `corrosion-ai config --set-api-key YOUR_KEY`")]
    MissingApiKey {
        provider: AiProvider,
        env_var: &'static str,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("No images found: {0}")]
    NoImagesFound(String),

    #[error("Unsupported image file: {0}")]
    UnsupportedImage(String),

    /// The request never got an HTTP response.
    #[error("Cannot connect to {provider} API: {message}")]
    Connection { provider: String, message: String },

    /// Non-2xx response; `body` is the provider's text, unmodified.
    #[error("{provider} API returned HTTP {status}: {body}")]
    ApiStatus {
        provider: String,
        status: u16,
        body: String,
    },

    /// 2xx response without usable text content.
    #[error("Unexpected response from {provider} API: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] corrosion_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, CorrosionError>;
