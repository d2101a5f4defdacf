use crate::ai_provider::AiProvider;
use crate::error::{CorrosionError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: AiProvider,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub claude_model: String,
    pub openai_model: String,
    pub anthropic_base_url: String,
    pub openai_base_url: String,
    pub timeout_seconds: u64,
    /// Images beyond this count are dropped before analysis
    pub max_images: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: AiProvider::Claude,
            anthropic_api_key: None,
            openai_api_key: None,
            claude_model: AiProvider::Claude.default_model().into(),
            openai_model: AiProvider::Openai.default_model().into(),
            anthropic_base_url: AiProvider::Claude.default_base_url().into(),
            openai_base_url: AiProvider::Openai.default_base_url().into(),
            timeout_seconds: 120,
            max_images: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CorrosionError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("corrosion-ai").join("config.json"))
    }

    /// API key for `provider`; the environment variable wins over the file.
    pub fn get_api_key(&self, provider: AiProvider) -> Result<String> {
        if let Ok(key) = std::env::var(provider.api_key_env()) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.stored_api_key(provider)
            .cloned()
            .ok_or(CorrosionError::MissingApiKey {
                provider,
                env_var: provider.api_key_env(),
            })
    }

    fn stored_api_key(&self, provider: AiProvider) -> Option<&String> {
        match provider {
            AiProvider::Claude => self.anthropic_api_key.as_ref(),
            AiProvider::Openai => self.openai_api_key.as_ref(),
        }
        .filter(|key| !key.trim().is_empty())
    }

    pub fn set_api_key(&mut self, provider: AiProvider, key: String) {
        match provider {
            AiProvider::Claude => self.anthropic_api_key = Some(key),
            AiProvider::Openai => self.openai_api_key = Some(key),
        }
    }

    pub fn has_api_key(&self, provider: AiProvider) -> bool {
        self.stored_api_key(provider).is_some()
    }

    pub fn model(&self, provider: AiProvider) -> &str {
        match provider {
            AiProvider::Claude => &self.claude_model,
            AiProvider::Openai => &self.openai_model,
        }
    }

    pub fn base_url(&self, provider: AiProvider) -> &str {
        match provider {
            AiProvider::Claude => &self.anthropic_base_url,
            AiProvider::Openai => &self.openai_base_url,
        }
    }
}
