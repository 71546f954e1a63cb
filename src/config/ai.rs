//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::ai::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL};

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Turn model-assisted extraction on or off
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Primary AI provider
    #[serde(default)]
    pub primary_provider: AiProvider,

    /// Fallback AI provider
    pub fallback_provider: Option<AiProvider>,

    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Bound on one model call in seconds, retries included
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    #[default]
    Anthropic,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// True if `provider` has an API key.
    pub fn has_key_for(&self, provider: AiProvider) -> bool {
        match provider {
            AiProvider::OpenAI => self.has_openai(),
            AiProvider::Anthropic => self.has_anthropic(),
        }
    }

    /// True if the model extractor can run: enabled and the primary has a key.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.has_key_for(self.primary_provider)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_secs == 0 {
            return Err(ConfigValidationError::MustBePositive("ai.timeout_secs"));
        }
        if !self.enabled {
            return Ok(());
        }

        match self.primary_provider {
            AiProvider::OpenAI if !self.has_openai() => {
                return Err(ConfigValidationError::MissingRequired("OPENAI_API_KEY"));
            }
            AiProvider::Anthropic if !self.has_anthropic() => {
                return Err(ConfigValidationError::MissingRequired("ANTHROPIC_API_KEY"));
            }
            _ => {}
        }

        if let Some(fallback) = self.fallback_provider {
            if fallback == self.primary_provider {
                return Err(ConfigValidationError::FallbackSameAsPrimary);
            }
            if !self.has_key_for(fallback) {
                return Err(ConfigValidationError::MissingRequired(match fallback {
                    AiProvider::OpenAI => "OPENAI_API_KEY",
                    AiProvider::Anthropic => "ANTHROPIC_API_KEY",
                }));
            }
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            openai_api_key: None,
            anthropic_api_key: None,
            primary_provider: AiProvider::default(),
            fallback_provider: None,
            anthropic_model: default_anthropic_model(),
            openai_model: default_openai_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}
