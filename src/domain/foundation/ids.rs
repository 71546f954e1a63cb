//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Maximum accepted length of a caller-supplied session id.
pub const MAX_SESSION_ID_LENGTH: usize = 128;

/// Identifier of a conversation session.
///
/// Generated ids are UUID v4 strings, but callers may bring their own
/// opaque id (e.g. from an HTTP cookie) as long as it is non-empty,
/// whitespace-free and at most [`MAX_SESSION_ID_LENGTH`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validates and wraps a caller-supplied id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        if trimmed.len() > MAX_SESSION_ID_LENGTH {
            return Err(ValidationError::too_long(
                "session_id",
                MAX_SESSION_ID_LENGTH,
                trimmed.len(),
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(
                "session_id",
                "must not contain whitespace",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn parse_accepts_opaque_ids() {
        let id = SessionId::parse("web-session-42").unwrap();
        assert_eq!(id.as_str(), "web-session-42");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let id = SessionId::parse("  abc  ").unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            SessionId::parse("   "),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn parse_rejects_inner_whitespace() {
        assert!(matches!(
            SessionId::parse("a b"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn parse_rejects_overlong_ids() {
        let raw = "x".repeat(MAX_SESSION_ID_LENGTH + 1);
        assert!(matches!(
            SessionId::parse(raw),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn serializes_transparently() {
        let id = SessionId::parse("s-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s-1\"");
        let back: SessionId = serde_json::from_str("\"s-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn from_str_delegates_to_parse() {
        let id: SessionId = "abc".parse().unwrap();
        assert_eq!(id.to_string(), "abc");
    }
}
