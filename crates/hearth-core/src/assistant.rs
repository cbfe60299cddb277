//! The assistant façade.
//!
//! One entry point per turn: [`Assistant::process`] resolves the
//! conversation, classifies the message against its context, plans
//! actions, produces the reply (template or backend) and records the turn.
//! Planned actions are returned, not executed; [`Assistant::dispatch`]
//! sends them to the router when the caller is ready.
//!
//! A per-conversation async lock is held for the whole turn, so two
//! messages to the same conversation are processed one after the other
//! and each sees the other's effects. Deleting a conversation takes the
//! same lock. Dispatch runs outside it.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use hearth_types::action::{ActionDescriptor, ActionOutcome};
use hearth_types::classification::Classification;
use hearth_types::config::HearthConfig;
use hearth_types::context::{ConversationContext, ConversationKey, Turn, UserInsights, UserPreferences};
use hearth_types::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::{self, ChatBackend, APOLOGY, DEGRADED_CONFIDENCE};
use crate::context::{ContextManager, ContextStore, InMemoryContextStore};
use crate::pipeline::classifier::PatternClassifier;
use crate::pipeline::planner::ActionPlanner;
use crate::pipeline::random::ThreadRandom;
use crate::pipeline::responder::TemplateResponder;
use crate::pipeline::strategy::StrategySelector;
use crate::pipeline::traits::{RandomSource, UtteranceClassifier};
use crate::router::SystemRouter;

/// Result of one processed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReply {
    /// The conversation the turn was recorded in.
    pub conversation: ConversationKey,
    /// The assistant's reply.
    pub text: String,
    /// How the message was understood.
    pub classification: Classification,
    /// Actions the caller may dispatch.
    pub actions: Vec<ActionDescriptor>,
}

/// Builder for [`Assistant`].
pub struct AssistantBuilder {
    config: HearthConfig,
    classifier: Option<Arc<dyn UtteranceClassifier>>,
    random: Arc<dyn RandomSource>,
    store: Arc<dyn ContextStore>,
    router: SystemRouter,
    backend: Option<Arc<dyn ChatBackend>>,
}

impl AssistantBuilder {
    /// Replace the classifier.
    pub fn classifier(mut self, classifier: Arc<dyn UtteranceClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Replace the responder's random source.
    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Replace the context store.
    pub fn store(mut self, store: Arc<dyn ContextStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the system router.
    pub fn router(mut self, router: SystemRouter) -> Self {
        self.router = router;
        self
    }

    /// Attach a chat backend for conversational replies.
    pub fn backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Validate the configuration and build.
    ///
    /// # Errors
    ///
    /// [`hearth_types::HearthError::ConfigInvalid`] if the configuration
    /// fails validation.
    pub fn build(self) -> Result<Assistant> {
        self.config.validate()?;
        let strategy = StrategySelector::new(&self.config.strategy);
        let classifier = self.classifier.unwrap_or_else(|| {
            Arc::new(PatternClassifier::new(
                self.config.classifier.clone(),
                strategy.clone(),
            ))
        });
        Ok(Assistant {
            classifier,
            strategy,
            responder: TemplateResponder::new(self.random, self.config.assistant.style),
            planner: ActionPlanner::new(),
            contexts: ContextManager::with_store(self.config.context.clone(), self.store),
            router: self.router,
            backend: self.backend,
            turn_locks: DashMap::new(),
            config: self.config,
        })
    }
}

/// Conversational home assistant.
pub struct Assistant {
    config: HearthConfig,
    classifier: Arc<dyn UtteranceClassifier>,
    strategy: StrategySelector,
    responder: TemplateResponder,
    planner: ActionPlanner,
    contexts: ContextManager,
    router: SystemRouter,
    backend: Option<Arc<dyn ChatBackend>>,
    turn_locks: DashMap<ConversationKey, Arc<Mutex<()>>>,
}

impl Assistant {
    /// Start building an assistant. Defaults: pattern classifier,
    /// thread RNG, in-memory store, simulated router, no backend.
    pub fn builder(config: HearthConfig) -> AssistantBuilder {
        AssistantBuilder {
            config,
            classifier: None,
            random: Arc::new(ThreadRandom),
            store: Arc::new(InMemoryContextStore::new()),
            router: SystemRouter::simulated(),
            backend: None,
        }
    }

    /// Assistant with every default.
    pub fn new(config: HearthConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// The configuration in effect.
    pub fn config(&self) -> &HearthConfig {
        &self.config
    }

    /// The system router used by [`dispatch`](Self::dispatch).
    pub fn router(&self) -> &SystemRouter {
        &self.router
    }

    /// Resolve the conversation key, minting what the caller left out.
    pub fn resolve_key(&self, user_id: Option<&str>, conversation_id: Option<&str>) -> ConversationKey {
        let user = user_id
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.config.assistant.default_user);
        match conversation_id.map(str::trim).filter(|c| !c.is_empty()) {
            Some(conversation) => ConversationKey::new(user, conversation),
            None => ConversationKey::fresh(user),
        }
    }

    fn turn_lock(&self, key: &ConversationKey) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Process one user message.
    ///
    /// Never fails: degenerate input falls back to the casual category and
    /// backend outages are answered with an apology.
    ///
    /// The conversation's lock is held across the backend call, so a slow
    /// backend delays later turns of the same conversation by up to
    /// `assistant.backend_timeout_ms`. Other conversations are unaffected.
    pub async fn process(
        &self,
        user_id: Option<&str>,
        conversation_id: Option<&str>,
        message: &str,
    ) -> TurnReply {
        self.run_turn(user_id, conversation_id, message, None).await
    }

    /// Like [`process`](Self::process), but passes the reply to `on_chunk`
    /// as it is produced.
    ///
    /// Backend replies arrive chunk by chunk; template replies and the
    /// apology arrive as a single chunk. If a backend stream breaks midway
    /// the chunks already delivered are followed by the apology, which is
    /// also the text of the returned reply.
    pub async fn process_streamed<F>(
        &self,
        user_id: Option<&str>,
        conversation_id: Option<&str>,
        message: &str,
        mut on_chunk: F,
    ) -> TurnReply
    where
        F: FnMut(&str) + Send,
    {
        let emit: &mut (dyn FnMut(&str) + Send) = &mut on_chunk;
        self.run_turn(user_id, conversation_id, message, Some(emit)).await
    }

    async fn run_turn(
        &self,
        user_id: Option<&str>,
        conversation_id: Option<&str>,
        message: &str,
        mut on_chunk: Option<&mut (dyn FnMut(&str) + Send)>,
    ) -> TurnReply {
        let key = self.resolve_key(user_id, conversation_id);
        let lock = self.turn_lock(&key);
        let _guard = lock.lock().await;

        let snapshot = self.contexts.snapshot(&key);
        let mut classification = self.classifier.classify(message, Some(&snapshot));
        let actions = self.planner.plan(&classification, &snapshot);

        let generative = self.config.assistant.generative_replies
            && actions.is_empty()
            && !classification.response_strategy.use_tools;
        let mut streamed = false;
        let text = match (&self.backend, generative) {
            (Some(backend), true) => {
                let prompt = backend::system_prompt(&self.config.assistant, &classification, &snapshot);
                let history = self
                    .contexts
                    .find(&key)
                    .map(|ctx| ctx.history(self.config.context.classifier_window))
                    .unwrap_or_default();
                let request = backend::build_request(prompt, &history, message);
                let limit = Duration::from_millis(self.config.assistant.backend_timeout_ms);
                let reply = match on_chunk.as_deref_mut() {
                    Some(emit) => {
                        let reply =
                            backend::generate_streamed(backend.as_ref(), &request, limit, |c| emit(c))
                                .await;
                        streamed = reply.is_some();
                        reply
                    }
                    None => backend::generate(backend.as_ref(), &request, limit).await,
                };
                match reply {
                    Some(reply) => reply,
                    None => {
                        self.degrade(&mut classification);
                        APOLOGY.to_string()
                    }
                }
            }
            _ => self.responder.respond(&classification, &snapshot),
        };
        if !streamed && let Some(emit) = on_chunk.as_deref_mut() {
            emit(&text);
        }

        self.contexts.record_turn(&key, message, &text, &classification);

        info!(
            conversation = %key,
            category = %classification.category,
            intent = %classification.intent,
            confidence = classification.confidence,
            actions = actions.len(),
            streamed,
            "processed turn"
        );

        TurnReply {
            conversation: key,
            text,
            classification,
            actions,
        }
    }

    fn degrade(&self, classification: &mut Classification) {
        classification.confidence = DEGRADED_CONFIDENCE;
        classification.response_strategy = self.strategy.select(
            classification.category,
            classification.intent,
            DEGRADED_CONFIDENCE,
        );
    }

    /// Process a message and immediately dispatch its actions.
    pub async fn process_and_dispatch(
        &self,
        user_id: Option<&str>,
        conversation_id: Option<&str>,
        message: &str,
    ) -> (TurnReply, Vec<ActionOutcome>) {
        let reply = self.process(user_id, conversation_id, message).await;
        let outcomes = self.dispatch(&reply.actions).await;
        (reply, outcomes)
    }

    /// Execute planned actions through the router.
    pub async fn dispatch(&self, actions: &[ActionDescriptor]) -> Vec<ActionOutcome> {
        if actions.is_empty() {
            return Vec::new();
        }
        let outcomes = self.router.dispatch_all(actions).await;
        debug!(
            dispatched = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.result.success).count(),
            "dispatched actions"
        );
        outcomes
    }

    /// The last `limit` turns of a conversation, most recent last.
    ///
    /// # Errors
    ///
    /// [`hearth_types::HearthError::UnknownConversation`] for an unknown key.
    pub fn get_history(&self, key: &ConversationKey, limit: usize) -> Result<Vec<Turn>> {
        self.contexts.history(key, limit)
    }

    /// The full context of a conversation, if it exists.
    pub fn context(&self, key: &ConversationKey) -> Option<ConversationContext> {
        self.contexts.find(key)
    }

    /// Every known conversation.
    pub fn conversations(&self) -> Vec<ConversationKey> {
        self.contexts.conversations()
    }

    /// Replace the user's preferences for a conversation.
    pub fn set_preferences(&self, key: &ConversationKey, preferences: UserPreferences) {
        self.contexts.set_preferences(key, preferences);
    }

    /// What a conversation reveals about the user.
    ///
    /// # Errors
    ///
    /// [`hearth_types::HearthError::UnknownConversation`] for an unknown key.
    pub fn insights(&self, key: &ConversationKey) -> Result<UserInsights> {
        self.contexts.insights(key)
    }

    /// Delete a conversation. Idempotent; returns whether it existed.
    ///
    /// Waits for a turn already running on the conversation, so that turn
    /// is deleted too rather than recreating the context afterwards. The
    /// turn lock is forgotten only when no other turn holds or awaits it.
    pub async fn delete(&self, key: &ConversationKey) -> bool {
        let existed = {
            let lock = self.turn_lock(key);
            let _guard = lock.lock().await;
            self.contexts.clear(key)
        };
        self.turn_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        existed
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("config", &self.config)
            .field("router", &self.router)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .finish_non_exhaustive()
    }
}
