//! Remediation hints for failed analyses
//!
//! Error messages carry the provider's text verbatim, so the hint is chosen
//! by substring match on that text.

use std::fmt;

/// What the user can do about a failed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHint {
    InsufficientCredits,
    InvalidApiKey,
    RateLimited,
    Unknown,
}

impl ErrorHint {
    /// Classify an error message. Checks run in the order credits, key,
    /// rate limit, case-insensitively.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has_any(&["credit", "balance"]) {
            ErrorHint::InsufficientCredits
        } else if has_any(&["api_key", "invalid", "authentication"]) {
            ErrorHint::InvalidApiKey
        } else if has_any(&["rate", "limit"]) {
            ErrorHint::RateLimited
        } else {
            ErrorHint::Unknown
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ErrorHint::InsufficientCredits => "Insufficient API credits",
            ErrorHint::InvalidApiKey => "Invalid API key",
            ErrorHint::RateLimited => "API rate limit exceeded",
            ErrorHint::Unknown => "An error occurred during analysis",
        }
    }

    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            ErrorHint::InsufficientCredits => Some(
                "Add credits to your account (Claude: console.anthropic.com → Plans & Billing, \
                 OpenAI: platform.openai.com → Billing) and try again.",
            ),
            ErrorHint::InvalidApiKey => Some(
                "Check your API key. Anthropic keys start with 'sk-ant-', OpenAI keys with 'sk-'.",
            ),
            ErrorHint::RateLimited => Some("Wait a moment and try again."),
            ErrorHint::Unknown => None,
        }
    }
}

impl fmt::Display for ErrorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
