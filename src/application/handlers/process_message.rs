//! ProcessMessage command handler.
//!
//! Runs one conversational turn: restore the session, classify and extract,
//! consult the intent cache or the model when the pattern engine leaves gaps,
//! merge into the session intent, and answer with either the next question or
//! a ready signal.
//!
//! The handler never fails. Model errors degrade to the pattern result and a
//! failing session store degrades to a turn computed on the decoded context
//! alone, which the caller still receives as a token.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::adapters::ai::{
    AnthropicConfig, AnthropicProvider, FailoverAIProvider, OpenAIConfig, OpenAIProvider,
};
use crate::config::{AiConfig, AiProvider, AppConfig};
use crate::domain::cache::{HitKind, IntentCache};
use crate::domain::classifier::{ClassificationResult, MessageClassifier, RuleBasedClassifier};
use crate::domain::conversation::{
    ChatMessage, ConversationContext, ConversationStateManager, DialogueState, Role, SessionError,
};
use crate::domain::extraction::{combine, combine_cached, ModelExtractor, PatternExtractor};
use crate::domain::foundation::{SessionId, StateMachine, Timestamp};
use crate::domain::resolver::{can_generate, required_fields_missing, state_for, QuestionGenerator};
use crate::domain::trip::{merge_intents, IntentField, ParsedIntent};
use crate::ports::{AIError, AIProvider, RequestMetadata, SessionStore};

/// Command to process one user message.
#[derive(Debug, Clone, Default)]
pub struct ProcessMessageCommand {
    /// Context token returned by the previous turn. Takes precedence over
    /// `session_id`.
    pub session_token: Option<String>,
    /// Session to continue from the store.
    pub session_id: Option<SessionId>,
    /// The user's message.
    pub message: String,
}

impl ProcessMessageCommand {
    /// Starts a new session.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Continues a session carried by a token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Continues a session held in the store.
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// What the caller should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A required field is missing; show `question` to the user.
    AskQuestion { field: IntentField, question: String },
    /// The intent is complete and can be handed to the itinerary generator.
    ReadyToGenerate,
}

impl TurnOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, TurnOutcome::ReadyToGenerate)
    }
}

/// Where this turn's fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The pattern engine alone was enough.
    Pattern,
    /// A cached model result was reused.
    Cache(HitKind),
    /// The model was called.
    Model,
    /// The model was needed but unavailable or failed.
    PatternFallback,
}

/// Result of processing one message.
#[derive(Debug, Clone)]
pub struct ProcessMessageResult {
    pub session_id: SessionId,
    /// Opaque token to send back with the next message.
    pub context_token: String,
    pub classification: ClassificationResult,
    /// The session's accumulated intent after this turn.
    pub intent: ParsedIntent,
    pub state: DialogueState,
    pub source: ExtractionSource,
    pub outcome: TurnOutcome,
}

struct TurnExtraction {
    classification: ClassificationResult,
    intent: ParsedIntent,
    source: ExtractionSource,
}

/// Handler for processing user messages.
pub struct ProcessMessageHandler {
    classifier: Arc<dyn MessageClassifier>,
    pattern: PatternExtractor,
    model: Option<ModelExtractor>,
    cache: Arc<IntentCache>,
    sessions: ConversationStateManager,
    questions: QuestionGenerator,
}

impl ProcessMessageHandler {
    /// Creates a pattern-only handler.
    pub fn new(sessions: ConversationStateManager, cache: Arc<IntentCache>, today: NaiveDate) -> Self {
        Self {
            classifier: Arc::new(RuleBasedClassifier::new()),
            pattern: PatternExtractor::new(today),
            model: None,
            cache,
            sessions,
            questions: QuestionGenerator::new(),
        }
    }

    /// Wires the handler from configuration.
    ///
    /// Runs pattern-only when AI is disabled, no key is configured, or the
    /// provider client cannot be built.
    pub fn from_config(config: &AppConfig, store: Arc<dyn SessionStore>) -> Self {
        let today = Local::now().date_naive();
        let sessions =
            ConversationStateManager::new(store).with_settings(config.session.settings());
        let cache = Arc::new(IntentCache::new(config.cache.settings()));
        let handler = Self::new(sessions, cache, today);

        if !config.ai.is_usable() {
            tracing::info!(
                target: "trip_intent::pipeline",
                enabled = config.ai.enabled,
                "model extraction off, running pattern-only"
            );
            return handler;
        }

        match build_provider(&config.ai) {
            Ok(provider) => {
                let extractor =
                    ModelExtractor::new(provider, today).with_timeout(config.ai.timeout());
                handler.with_model_extractor(extractor)
            }
            Err(e) => {
                tracing::warn!(
                    target: "trip_intent::pipeline",
                    error = %e,
                    "could not build AI provider, running pattern-only"
                );
                handler
            }
        }
    }

    pub fn with_model_extractor(mut self, extractor: ModelExtractor) -> Self {
        self.model = Some(extractor);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn MessageClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn sessions(&self) -> &ConversationStateManager {
        &self.sessions
    }

    pub fn cache(&self) -> &IntentCache {
        &self.cache
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Processes one message. Always yields a question or a ready signal.
    pub async fn handle(&self, cmd: ProcessMessageCommand) -> ProcessMessageResult {
        let (session_id, decoded) = match (&cmd.session_token, &cmd.session_id) {
            (Some(token), _) => {
                let context = self.sessions.deserialize(token);
                (context.session_id.clone(), Some(context))
            }
            (None, Some(id)) => (id.clone(), None),
            (None, None) => (SessionId::new(), None),
        };

        let _turn = self.sessions.lock_session(&session_id).await;

        match self.run(&session_id, decoded.clone(), &cmd.message).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    target: "trip_intent::pipeline",
                    session_id = %session_id,
                    error = %e,
                    "session store unavailable, processing turn without it"
                );
                self.run_detached(session_id, decoded, &cmd.message).await
            }
        }
    }

    async fn run(
        &self,
        session_id: &SessionId,
        decoded: Option<ConversationContext>,
        message: &str,
    ) -> Result<ProcessMessageResult, SessionError> {
        let context = match decoded {
            Some(context) => self.sessions.resume(context).await?,
            None => self.sessions.get_or_create(session_id).await?,
        };
        let prior = context.intent;

        let context = self
            .sessions
            .add_message(session_id, Role::User, message)
            .await?;
        let turn = self
            .extract(message, &prior, context.has_prior_user_turns(), session_id)
            .await;

        let context = self.sessions.update_intent(session_id, turn.intent).await?;
        let (outcome, reply) = self.respond(&context.intent);
        if let Some(next) = next_state(context.state, &context.intent) {
            self.sessions.update_state(session_id, next).await?;
        }
        let context = self
            .sessions
            .add_message(session_id, Role::Assistant, reply)
            .await?;
        let context_token = self.sessions.serialize(&context)?;

        self.log_turn(&context, &turn.source, &outcome);
        Ok(ProcessMessageResult {
            session_id: context.session_id,
            context_token,
            classification: turn.classification,
            intent: context.intent,
            state: context.state,
            source: turn.source,
            outcome,
        })
    }

    /// Same turn as [`Self::run`], on an in-memory context only.
    async fn run_detached(
        &self,
        session_id: SessionId,
        decoded: Option<ConversationContext>,
        message: &str,
    ) -> ProcessMessageResult {
        let ttl = self.sessions.settings().ttl_secs;
        let limits = self.sessions.settings().history_limits();
        let mut context = decoded
            .filter(|c| !c.is_expired(ttl, &Timestamp::now()))
            .unwrap_or_else(|| ConversationContext::new(session_id.clone()));
        let prior = context.intent.clone();

        context.push_message(ChatMessage::new(Role::User, message), limits);
        let turn = self
            .extract(message, &prior, context.has_prior_user_turns(), &session_id)
            .await;

        context.intent.absorb(turn.intent);
        let (outcome, reply) = self.respond(&context.intent);
        if let Some(next) = next_state(context.state, &context.intent) {
            context.state = context.state.transition_to(next).unwrap_or(context.state);
        }
        context.push_message(ChatMessage::new(Role::Assistant, reply), limits);
        context.touch();

        let context_token = match self.sessions.serialize(&context) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    target: "trip_intent::pipeline",
                    session_id = %session_id,
                    error = %e,
                    "could not encode context token"
                );
                String::new()
            }
        };

        self.log_turn(&context, &turn.source, &outcome);
        ProcessMessageResult {
            session_id: context.session_id,
            context_token,
            classification: turn.classification,
            intent: context.intent,
            state: context.state,
            source: turn.source,
            outcome,
        }
    }

    /// Classifies and extracts one message against the session's prior intent.
    async fn extract(
        &self,
        message: &str,
        prior: &ParsedIntent,
        has_history: bool,
        session_id: &SessionId,
    ) -> TurnExtraction {
        let classification = self.classifier.classify(message, has_history);
        let pattern = self.pattern.extract(message, Some(prior));

        if can_generate(&merge_intents(prior, &pattern)) {
            return TurnExtraction {
                classification,
                intent: pattern,
                source: ExtractionSource::Pattern,
            };
        }

        let Some(model) = &self.model else {
            return TurnExtraction {
                classification,
                intent: pattern,
                source: ExtractionSource::Pattern,
            };
        };

        let extension_prior = self.pattern.is_extension(message, Some(prior)).then_some(prior);

        if let Some(hit) = self.cache.lookup(message) {
            tracing::debug!(
                target: "trip_intent::pipeline",
                session_id = %session_id,
                kind = ?hit.kind,
                key = %hit.key,
                "reusing cached extraction"
            );
            return TurnExtraction {
                classification,
                intent: combine_cached(&pattern, hit.intent, extension_prior, message),
                source: ExtractionSource::Cache(hit.kind),
            };
        }

        let metadata = RequestMetadata::for_session(session_id.clone());
        match model.extract(message, Some(prior), metadata).await {
            Ok(found) => {
                self.cache.store(message, &found);
                TurnExtraction {
                    classification,
                    intent: combine(&pattern, found, extension_prior, message),
                    source: ExtractionSource::Model,
                }
            }
            Err(e) => {
                tracing::warn!(
                    target: "trip_intent::pipeline",
                    session_id = %session_id,
                    error = %e,
                    "model extraction failed, using pattern result"
                );
                TurnExtraction {
                    classification,
                    intent: pattern,
                    source: ExtractionSource::PatternFallback,
                }
            }
        }
    }

    fn respond(&self, intent: &ParsedIntent) -> (TurnOutcome, String) {
        match required_fields_missing(intent).first() {
            Some(&field) => {
                let question = self.questions.next_question(field, intent);
                let reply = question.clone();
                (TurnOutcome::AskQuestion { field, question }, reply)
            }
            None => (
                TurnOutcome::ReadyToGenerate,
                format!("Great, I have everything I need: {}.", intent.summary()),
            ),
        }
    }

    fn log_turn(&self, context: &ConversationContext, source: &ExtractionSource, outcome: &TurnOutcome) {
        tracing::info!(
            target: "trip_intent::pipeline",
            session_id = %context.session_id,
            state = %context.state,
            source = ?source,
            ready = outcome.is_ready(),
            intent = %context.intent.summary(),
            "turn processed"
        );
    }
}

/// State the resolver moves the dialogue to, or `None` while the itinerary
/// generator owns it.
fn next_state(current: DialogueState, intent: &ParsedIntent) -> Option<DialogueState> {
    // Feedback turns may reopen collection.
    if current.is_generation_phase() && current != DialogueState::AwaitingFeedback {
        return None;
    }
    Some(state_for(&required_fields_missing(intent)))
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProvider>, AIError> {
    let primary = provider_client(ai, ai.primary_provider)?;
    let fallback = match ai.fallback_provider {
        Some(kind) if kind != ai.primary_provider && ai.has_key_for(kind) => {
            Some(provider_client(ai, kind)?)
        }
        _ => None,
    };
    Ok(match fallback {
        Some(fallback) => Arc::new(FailoverAIProvider::new(primary).with_fallback(fallback)),
        None => primary,
    })
}

fn provider_client(ai: &AiConfig, kind: AiProvider) -> Result<Arc<dyn AIProvider>, AIError> {
    let provider: Arc<dyn AIProvider> = match kind {
        AiProvider::Anthropic => {
            let key = ai.anthropic_api_key.clone().unwrap_or_default();
            let config = AnthropicConfig::new(key)
                .with_model(ai.anthropic_model.clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            Arc::new(AnthropicProvider::new(config)?)
        }
        AiProvider::OpenAI => {
            let key = ai.openai_api_key.clone().unwrap_or_default();
            let config = OpenAIConfig::new(key)
                .with_model(ai.openai_model.clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            Arc::new(OpenAIProvider::new(config)?)
        }
    };
    Ok(provider)
}
