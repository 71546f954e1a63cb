//! Integration tests for the conversational turn pipeline.
//!
//! These tests drive `ProcessMessageHandler` end to end:
//! 1. Session restore from a context token or the session store
//! 2. Classification and pattern extraction
//! 3. Cache lookup and scripted model calls for missing fields
//! 4. Merge into the session intent and the next question / ready signal
//!
//! Uses `MockAIProvider` and `InMemorySessionStore`; no network access.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use trip_intent::adapters::ai::{MockAIProvider, MockError};
use trip_intent::adapters::storage::InMemorySessionStore;
use trip_intent::application::{
    ExtractionSource, ProcessMessageCommand, ProcessMessageHandler, TurnOutcome,
};
use trip_intent::domain::cache::{CacheSettings, HitKind, IntentCache};
use trip_intent::domain::classifier::InputType;
use trip_intent::domain::conversation::{ConversationStateManager, DialogueState};
use trip_intent::domain::extraction::ModelExtractor;
use trip_intent::domain::trip::IntentField;
use trip_intent::ports::SessionStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

struct Harness {
    handler: ProcessMessageHandler,
    store: Arc<InMemorySessionStore>,
    provider: MockAIProvider,
}

impl Harness {
    fn new(provider: MockAIProvider) -> Self {
        let extractor = ModelExtractor::new(Arc::new(provider.clone()), today())
            .with_timeout(Duration::from_millis(500));
        let mut h = Self::pattern_only();
        h.handler = h.handler.with_model_extractor(extractor);
        h.provider = provider;
        h
    }

    fn pattern_only() -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let handler = ProcessMessageHandler::new(
            ConversationStateManager::new(store.clone()),
            Arc::new(IntentCache::new(CacheSettings::default())),
            today(),
        );
        Self {
            handler,
            store,
            provider: MockAIProvider::new(),
        }
    }
}

// =============================================================================
// Multi-turn dialogue
// =============================================================================

#[tokio::test]
async fn paris_trip_asks_for_a_date_then_becomes_ready() {
    let h = Harness::pattern_only();

    let first = h
        .handler
        .handle(ProcessMessageCommand::new("I want to go to Paris for 5 days"))
        .await;

    assert_eq!(first.intent.destination.as_deref(), Some("Paris"));
    assert_eq!(first.intent.duration, Some(5));
    match &first.outcome {
        TurnOutcome::AskQuestion { field, question } => {
            assert_eq!(*field, IntentField::StartDate);
            assert!(question.contains("Paris"));
            assert!(question.contains("(5 days)"));
        }
        other => panic!("expected a date question, got {:?}", other),
    }

    let second = h
        .handler
        .handle(ProcessMessageCommand::new("We'll leave on August 3").with_token(&first.context_token))
        .await;

    assert_eq!(second.session_id, first.session_id);
    assert!(second.outcome.is_ready());
    assert_eq!(second.state, DialogueState::ReadyToGenerate);
    assert_eq!(second.intent.start_date, date(2025, 8, 3));
    assert_eq!(second.intent.end_date, date(2025, 8, 7));
}

#[tokio::test]
async fn structured_message_is_ready_in_one_turn() {
    let h = Harness::pattern_only();

    let result = h
        .handler
        .handle(ProcessMessageCommand::new("3 days in London from July 10"))
        .await;

    assert_eq!(result.classification.input_type, InputType::Structured);
    assert!(result.outcome.is_ready());
    assert_eq!(result.source, ExtractionSource::Pattern);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn extension_turn_adds_city_and_days() {
    let h = Harness::pattern_only();

    let first = h
        .handler
        .handle(ProcessMessageCommand::new("3 days in London starting July 1"))
        .await;
    assert!(first.outcome.is_ready());

    let second = h
        .handler
        .handle(
            ProcessMessageCommand::new("add 3 days in Paris")
                .with_session_id(first.session_id.clone()),
        )
        .await;

    assert_eq!(
        second.intent.destinations,
        Some(vec!["London".to_string(), "Paris".to_string()])
    );
    assert_eq!(second.intent.duration, Some(6));
    assert_eq!(second.intent.end_date, date(2025, 7, 6));
    assert_eq!(
        second.intent.modification_request.as_deref(),
        Some("add 3 days in Paris")
    );
    assert!(second.outcome.is_ready());
}

// =============================================================================
// Model-assisted extraction
// =============================================================================

#[tokio::test]
async fn model_supplies_destination_from_chatty_output() {
    let provider = MockAIProvider::new()
        .with_response("Here is the JSON:\n{\"destination\": \"Lisbon\", \"duration\": 7,}");
    let h = Harness::new(provider);

    let result = h
        .handler
        .handle(ProcessMessageCommand::new(
            "somewhere sunny by the sea for a week in August",
        ))
        .await;

    assert_eq!(result.source, ExtractionSource::Model);
    assert_eq!(result.intent.destination.as_deref(), Some("Lisbon"));
    assert_eq!(result.intent.start_date, date(2025, 8, 1));
    assert!(result.outcome.is_ready());
    assert_eq!(h.provider.call_count(), 1);
}

#[tokio::test]
async fn repeated_message_reuses_cached_model_result() {
    let provider = MockAIProvider::new().with_response(r#"{"destination": "Lisbon"}"#);
    let h = Harness::new(provider);
    let message = "somewhere sunny by the sea for a week in August";

    h.handler.handle(ProcessMessageCommand::new(message)).await;
    let again = h.handler.handle(ProcessMessageCommand::new(message)).await;

    assert_eq!(again.source, ExtractionSource::Cache(HitKind::Exact));
    assert_eq!(again.intent.destination.as_deref(), Some("Lisbon"));
    assert_eq!(h.provider.call_count(), 1);
    assert_eq!(h.handler.cache().stats().exact_hits, 1);
}

#[tokio::test]
async fn similar_cached_message_does_not_override_stated_city() {
    let provider = MockAIProvider::new().with_response(r#"{"destinations":["Rome"],"duration":5}"#);
    let h = Harness::new(provider);

    let first = h.handler.handle(ProcessMessageCommand::new("5 days in Rome")).await;
    assert_eq!(first.source, ExtractionSource::Model);

    let second = h.handler.handle(ProcessMessageCommand::new("5 days in Paris")).await;

    assert_eq!(second.source, ExtractionSource::Cache(HitKind::Fuzzy));
    assert_eq!(second.intent.destination.as_deref(), Some("Paris"));
    assert_eq!(second.intent.duration, Some(5));
    assert_eq!(h.provider.call_count(), 1);
}

#[tokio::test]
async fn unparseable_output_retries_once_then_falls_back() {
    let provider = MockAIProvider::new()
        .with_response("I'm sorry, I can't help with that.")
        .with_response("Still no structured data here.");
    let h = Harness::new(provider);

    let result = h
        .handler
        .handle(ProcessMessageCommand::new("I want to go to Paris for 5 days"))
        .await;

    assert_eq!(h.provider.call_count(), 2);
    assert_eq!(result.source, ExtractionSource::PatternFallback);
    assert_eq!(result.intent.destination.as_deref(), Some("Paris"));
    assert!(matches!(
        result.outcome,
        TurnOutcome::AskQuestion {
            field: IntentField::StartDate,
            ..
        }
    ));
}

#[tokio::test]
async fn provider_outage_never_reaches_the_caller() {
    let provider = MockAIProvider::new().with_error(MockError::Unavailable {
        message: "overloaded".to_string(),
    });
    let h = Harness::new(provider);

    let result = h
        .handler
        .handle(ProcessMessageCommand::new("a week somewhere warm"))
        .await;

    assert_eq!(result.source, ExtractionSource::PatternFallback);
    assert_eq!(result.intent.duration, Some(7));
    assert!(matches!(
        result.outcome,
        TurnOutcome::AskQuestion {
            field: IntentField::Destination,
            ..
        }
    ));
}

// =============================================================================
// Session transport
// =============================================================================

#[tokio::test]
async fn garbage_token_starts_over() {
    let h = Harness::pattern_only();

    let result = h
        .handler
        .handle(ProcessMessageCommand::new("weekend in Rome").with_token("%%% not a token %%%"))
        .await;

    assert_eq!(result.intent.destination.as_deref(), Some("Rome"));
    assert_eq!(result.intent.duration, Some(3));
    assert!(h.store.get(&result.session_id).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_turns_on_one_session_are_serialized() {
    let h = Arc::new(Harness::pattern_only());
    let first = h
        .handler
        .handle(ProcessMessageCommand::new("I want to go to Paris"))
        .await;

    let a = {
        let h = h.clone();
        let id = first.session_id.clone();
        tokio::spawn(async move {
            h.handler
                .handle(ProcessMessageCommand::new("for 5 days").with_session_id(id))
                .await
        })
    };
    let b = {
        let h = h.clone();
        let id = first.session_id.clone();
        tokio::spawn(async move {
            h.handler
                .handle(ProcessMessageCommand::new("starting August 3").with_session_id(id))
                .await
        })
    };
    a.await.unwrap();
    b.await.unwrap();

    let stored = h.store.get(&first.session_id).await.unwrap().unwrap();
    assert_eq!(stored.messages.len(), 6);
    assert_eq!(stored.intent.duration, Some(5));
    assert_eq!(stored.intent.start_date, date(2025, 8, 3));
    assert_eq!(stored.state, DialogueState::ReadyToGenerate);
}
