//! Model-assisted extraction.
//!
//! Asks a language model for the explicitly stated trip fields, recovers a
//! JSON object from whatever comes back, and folds the result over the
//! pattern extraction. Any failure degrades to the pattern result.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::engine::apply_extension;
use super::model_output::intent_from_model_object;
use super::repair::{RepairChain, RepairError, Repaired};
use crate::domain::trip::ParsedIntent;
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Default bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

const EXTRACTION_MAX_TOKENS: u32 = 400;

const EXTRACTION_SYSTEM_PROMPT: &str = r#"You extract trip planning details from a traveler's message.

Return ONLY a JSON object. Include a field only if the traveler stated it explicitly in this message. Never guess or infer unstated facts.

Fields:
- "destinations": array of city or place names
- "startDate", "endDate": "YYYY-MM-DD"
- "duration": number of days
- "travelers": {"adults": number, "children": number}
- "budget": "budget" | "mid" | "luxury"
- "pace": "relaxed" | "moderate" | "packed"
- "interests", "mustSee", "avoid": arrays of strings

Examples:
Message: "3 days in London"
{"destinations": ["London"], "duration": 3}

Message: "Me and my wife want somewhere warm in Portugal from July 3 to July 9"
{"destinations": ["Portugal"], "startDate": "2025-07-03", "endDate": "2025-07-09", "travelers": {"adults": 2, "children": 0}}

Message: "add 2 days in Kyoto"
{"destinations": ["Kyoto"], "duration": 2}"#;

const RETRY_SYSTEM_PROMPT: &str =
    "Reply with a single JSON object and nothing else. No prose, no code fences.";

#[derive(Debug, Error)]
pub enum ModelExtractionError {
    #[error("Model call failed: {0}")]
    Provider(#[from] AIError),

    #[error("Model call exceeded {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Model output could not be parsed: {0}")]
    Unparseable(#[from] RepairError),
}

/// Extracts fields through an [`AIProvider`].
#[derive(Clone)]
pub struct ModelExtractor {
    provider: Arc<dyn AIProvider>,
    repair: RepairChain,
    timeout: Duration,
    today: NaiveDate,
}

impl ModelExtractor {
    pub fn new(provider: Arc<dyn AIProvider>, today: NaiveDate) -> Self {
        Self {
            provider,
            repair: RepairChain::new(),
            timeout: DEFAULT_MODEL_TIMEOUT,
            today,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Extracts the fields the model reports for `message`, as stated.
    ///
    /// When no object can be recovered from the first reply, one retry is made
    /// with a stripped-down prompt.
    pub async fn extract(
        &self,
        message: &str,
        prior: Option<&ParsedIntent>,
        metadata: RequestMetadata,
    ) -> Result<ParsedIntent, ModelExtractionError> {
        let request = CompletionRequest::new(metadata.clone())
            .with_system_prompt(EXTRACTION_SYSTEM_PROMPT)
            .with_message(MessageRole::User, self.user_prompt(message, prior))
            .with_max_tokens(EXTRACTION_MAX_TOKENS)
            .with_temperature(0.0);

        let repaired = match self.recover(request).await {
            Ok(repaired) => repaired,
            Err(ModelExtractionError::Unparseable(first)) => {
                tracing::debug!(
                    target: "trip_intent::model",
                    error = %first,
                    "retrying with simplified prompt"
                );
                let retry = CompletionRequest::new(metadata)
                    .with_system_prompt(RETRY_SYSTEM_PROMPT)
                    .with_message(MessageRole::User, self.retry_prompt(message))
                    .with_max_tokens(EXTRACTION_MAX_TOKENS)
                    .with_temperature(0.0);
                self.recover(retry).await?
            }
            Err(other) => return Err(other),
        };

        tracing::debug!(
            target: "trip_intent::model",
            stage = ?repaired.stage,
            "model output recovered"
        );
        Ok(intent_from_model_object(&repaired.object))
    }

    /// Runs the model extractor and merges over `pattern`. Never fails: any
    /// error is logged and `pattern` is returned unchanged.
    pub async fn extract_with_model(
        &self,
        message: &str,
        prior: Option<&ParsedIntent>,
        pattern: &ParsedIntent,
        is_extension: bool,
        metadata: RequestMetadata,
    ) -> ParsedIntent {
        match self.extract(message, prior, metadata).await {
            Ok(model) => combine(pattern, model, prior.filter(|_| is_extension), message),
            Err(e) => {
                tracing::warn!(
                    target: "trip_intent::model",
                    error = %e,
                    "model extraction failed, using pattern result"
                );
                pattern.clone()
            }
        }
    }

    async fn recover(&self, request: CompletionRequest) -> Result<Repaired, ModelExtractionError> {
        let call = self.provider.complete(request);
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ModelExtractionError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })??;
        Ok(self.repair.recover(&response.content)?)
    }

    fn user_prompt(&self, message: &str, prior: Option<&ParsedIntent>) -> String {
        let known = prior
            .filter(|p| !p.is_empty())
            .map(ParsedIntent::summary)
            .unwrap_or_else(|| "nothing yet".to_string());
        format!(
            "Today's date: {}\nAlready known about this trip: {}\nMessage: \"{}\"",
            self.today.format("%Y-%m-%d"),
            known,
            message.trim()
        )
    }

    fn retry_prompt(&self, message: &str) -> String {
        format!(
            "Today is {}. Give the destinations, startDate, endDate, duration and travelers stated in: \"{}\"",
            self.today.format("%Y-%m-%d"),
            message.trim()
        )
    }
}

impl std::fmt::Debug for ModelExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelExtractor")
            .field("provider", &self.provider.provider_info().name)
            .field("timeout", &self.timeout)
            .field("today", &self.today)
            .finish()
    }
}

/// Folds a model result over the pattern floor.
///
/// With `extension_prior` set, the model's destinations and duration are the
/// addend to the prior trip rather than replacements.
pub fn combine(
    pattern: &ParsedIntent,
    model: ParsedIntent,
    extension_prior: Option<&ParsedIntent>,
    message: &str,
) -> ParsedIntent {
    let model = as_extension(model, extension_prior, message);
    let mut merged = pattern.clone();
    merged.overlay(&model);
    merged
}

/// Folds a cached model result under the pattern result.
///
/// The cached value may belong to a similar but different message, so it only
/// fills fields the pattern engine left unset.
pub fn combine_cached(
    pattern: &ParsedIntent,
    cached: ParsedIntent,
    extension_prior: Option<&ParsedIntent>,
    message: &str,
) -> ParsedIntent {
    let mut merged = as_extension(cached, extension_prior, message);
    merged.overlay(pattern);
    merged
}

fn as_extension(
    mut model: ParsedIntent,
    extension_prior: Option<&ParsedIntent>,
    message: &str,
) -> ParsedIntent {
    if let Some(prior) = extension_prior {
        let added = model.destination_list();
        let days = model.duration;
        apply_extension(&mut model, prior, added, days, message);
    }
    model
}
