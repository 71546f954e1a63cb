//! Sanitization of raw model output before it is parsed.

use thiserror::Error;

/// Maximum accepted model response length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Chat-template and role markers stripped from model output.
const INJECTION_MARKERS: &[&str] = &[
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

/// Cleans model output: enforces a length cap, drops control characters
/// (newlines and tabs survive) and removes role markers.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer {
    extra_markers: Vec<String>,
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds markers to strip on top of the built-in list.
    pub fn with_extra_markers(mut self, markers: Vec<String>) -> Self {
        self.extra_markers = markers;
        self
    }

    pub fn sanitize(&self, response: &str) -> Result<String, SanitizationError> {
        if response.len() > MAX_RESPONSE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: response.len(),
            });
        }

        let mut cleaned: String = response
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        for marker in INJECTION_MARKERS
            .iter()
            .copied()
            .chain(self.extra_markers.iter().map(String::as_str))
        {
            cleaned = cleaned.replace(marker, "");
        }
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_clean_json_through() {
        let sanitizer = ResponseSanitizer::new();
        assert_eq!(
            sanitizer.sanitize(r#"{"destination":"Rome"}"#),
            Ok(r#"{"destination":"Rome"}"#.to_string())
        );
    }

    #[test]
    fn rejects_oversized_output() {
        let sanitizer = ResponseSanitizer::new();
        let long = "a".repeat(MAX_RESPONSE_LENGTH + 1);
        assert!(matches!(
            sanitizer.sanitize(&long),
            Err(SanitizationError::TooLong { .. })
        ));
    }

    #[test]
    fn strips_control_characters_but_keeps_newlines() {
        let sanitizer = ResponseSanitizer::new();
        let out = sanitizer.sanitize("{\x00\"a\":\x071}\n\t").unwrap();
        assert_eq!(out, "{\"a\":1}\n\t");
    }

    #[test]
    fn strips_role_markers() {
        let sanitizer = ResponseSanitizer::new();
        let out = sanitizer
            .sanitize("<|im_start|>{\"destination\":\"Oslo\"}<|im_end|>")
            .unwrap();
        assert_eq!(out, "{\"destination\":\"Oslo\"}");
    }

    #[test]
    fn extra_markers_are_stripped() {
        let sanitizer = ResponseSanitizer::new().with_extra_markers(vec!["###".to_string()]);
        assert_eq!(sanitizer.sanitize("### {}").unwrap(), " {}");
    }
}
