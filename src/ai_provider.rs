use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Anthropic Claude (recommended)
    #[default]
    Claude,
    /// OpenAI GPT-4o
    Openai,
}

impl AiProvider {
    pub fn name(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Openai => "openai",
        }
    }

    /// Environment variable that overrides the configured key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            AiProvider::Claude => "ANTHROPIC_API_KEY",
            AiProvider::Openai => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude-sonnet-4-20250514",
            AiProvider::Openai => "gpt-4o",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            AiProvider::Claude => "https://api.anthropic.com",
            AiProvider::Openai => "https://api.openai.com",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_enum_parsing() {
        assert_eq!(AiProvider::from_str("OpenAI", true), Ok(AiProvider::Openai));
        assert_eq!(AiProvider::from_str("claude", false), Ok(AiProvider::Claude));
        assert!(AiProvider::from_str("gemini", true).is_err());
    }

    #[test]
    fn test_display_matches_cli_value() {
        for provider in AiProvider::value_variants() {
            let value = provider.to_possible_value().unwrap();
            assert_eq!(value.get_name(), provider.to_string());
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&AiProvider::Openai).unwrap(), "\"openai\"");
        let provider: AiProvider = serde_json::from_str("\"claude\"").unwrap();
        assert_eq!(provider, AiProvider::Claude);
    }
}
