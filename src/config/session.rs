//! Conversation session configuration

use serde::Deserialize;

use super::error::ConfigValidationError;
use crate::domain::conversation::{SessionSettings, DEFAULT_MAX_MESSAGES, DEFAULT_SESSION_TTL_SECS};

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time in seconds after which a session starts over
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Messages kept per session
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Keep the first message when trimming history
    #[serde(default = "default_preserve_first")]
    pub preserve_first_message: bool,
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            ttl_secs: self.ttl_secs,
            max_messages: self.max_messages,
            preserve_first_message: self.preserve_first_message,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.ttl_secs == 0 {
            return Err(ConfigValidationError::MustBePositive("session.ttl_secs"));
        }
        if self.max_messages == 0 {
            return Err(ConfigValidationError::MustBePositive("session.max_messages"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_messages: default_max_messages(),
            preserve_first_message: default_preserve_first(),
        }
    }
}

fn default_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_preserve_first() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_domain_settings() {
        assert_eq!(SessionConfig::default().settings(), SessionSettings::default());
    }

    #[test]
    fn rejects_zero_ttl() {
        let config = SessionConfig {
            ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MustBePositive("session.ttl_secs"))
        );
    }
}
