//! Conversation context manager.
//!
//! Owns every [`ConversationContext`] through a pluggable [`ContextStore`]
//! and applies the per-turn update rules: bounded history, topic and
//! entity accumulation, learned category preferences and the
//! relationship-depth heuristic.
//!
//! Updates to one key are serialized by a per-key lock, so concurrent
//! `record_turn` calls for the same conversation never lose a turn.
//! Different keys never contend.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use hearth_types::classification::{Category, Classification, EmotionalTone};
use hearth_types::config::ContextConfig;
use hearth_types::context::{
    ContextSnapshot, ConversationContext, ConversationKey, Turn, UserInsights, UserPreferences,
};
use hearth_types::{HearthError, Result};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::pipeline::signals;

// ── Store ───────────────────────────────────────────────────────────────

/// Persistence seam for conversation contexts.
///
/// Implementations must be safe to call from many threads. The manager
/// never holds a value across calls; it reads, updates and writes back
/// under its own per-key lock.
pub trait ContextStore: Send + Sync {
    /// The stored context for `key`, if any.
    fn get(&self, key: &ConversationKey) -> Option<ConversationContext>;

    /// Insert or replace the context for its key.
    fn put(&self, context: ConversationContext);

    /// Remove the context for `key`. Returns whether it existed.
    fn delete(&self, key: &ConversationKey) -> bool;

    /// Every stored key.
    fn keys(&self) -> Vec<ConversationKey>;
}

/// In-process store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    contexts: DashMap<ConversationKey, ConversationContext>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContextStore for InMemoryContextStore {
    fn get(&self, key: &ConversationKey) -> Option<ConversationContext> {
        self.contexts.get(key).map(|c| c.value().clone())
    }

    fn put(&self, context: ConversationContext) {
        self.contexts.insert(context.key.clone(), context);
    }

    fn delete(&self, key: &ConversationKey) -> bool {
        self.contexts.remove(key).is_some()
    }

    fn keys(&self) -> Vec<ConversationKey> {
        let mut keys: Vec<ConversationKey> = self.contexts.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

// ── Topics ──────────────────────────────────────────────────────────────

/// Topic labels and the words that signal them.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("work", &["work", "job", "career", "office", "boss", "colleague"]),
    ("family", &["family", "parent", "child", "sibling", "relative"]),
    ("health", &["health", "doctor", "medicine", "exercise", "diet"]),
    ("technology", &["computer", "phone", "app", "software", "internet"]),
    ("entertainment", &["movie", "music", "game", "book", "show"]),
    ("travel", &["travel", "trip", "vacation", "flight", "hotel"]),
    ("food", &["food", "restaurant", "cooking", "recipe", "meal"]),
    ("relationships", &["friend", "relationship", "dating", "love", "partner"]),
];

/// Topic labels mentioned in `text`, in table order.
pub fn extract_topics(text: &str) -> Vec<&'static str> {
    let tokens: Vec<String> = signals::tokens(text).collect();
    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, words)| tokens.iter().any(|t| words.contains(&t.as_str())))
        .map(|(topic, _)| *topic)
        .collect()
}

// ── Manager ─────────────────────────────────────────────────────────────

/// Relationship-depth contribution per recorded turn.
const DEPTH_PER_MESSAGE: f32 = 0.02;
/// Relationship-depth contribution per distinct topic.
const DEPTH_PER_TOPIC: f32 = 0.01;

/// Owns conversation contexts and applies the per-turn update rules.
pub struct ContextManager {
    store: Arc<dyn ContextStore>,
    config: ContextConfig,
    write_locks: DashMap<ConversationKey, Arc<Mutex<()>>>,
}

impl ContextManager {
    /// Manager over an in-memory store.
    pub fn new(config: ContextConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryContextStore::new()))
    }

    /// Manager over a caller-supplied store.
    pub fn with_store(config: ContextConfig, store: Arc<dyn ContextStore>) -> Self {
        Self {
            store,
            config,
            write_locks: DashMap::new(),
        }
    }

    /// The window sizes in effect.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    fn lock_for(&self, key: &ConversationKey) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the lock entry for `key` if the map holds the only reference.
    /// Clones are taken under the shard lock, so the count cannot grow
    /// while `remove_if` inspects it.
    fn evict_lock(&self, key: &ConversationKey) {
        self.write_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// The context for `key`, created empty on first access.
    pub fn get_context(&self, key: &ConversationKey) -> ConversationContext {
        if let Some(ctx) = self.store.get(key) {
            return ctx;
        }
        let lock = self.lock_for(key);
        let _guard = lock.lock();
        match self.store.get(key) {
            Some(ctx) => ctx,
            None => {
                debug!(conversation = %key, "creating conversation context");
                let ctx = ConversationContext::new(key.clone());
                self.store.put(ctx.clone());
                ctx
            }
        }
    }

    /// The context for `key` without creating it.
    pub fn find(&self, key: &ConversationKey) -> Option<ConversationContext> {
        self.store.get(key)
    }

    /// Summary of the recent window for the classifier. An unknown key
    /// yields the empty snapshot and is not created.
    pub fn snapshot(&self, key: &ConversationKey) -> ContextSnapshot {
        self.store
            .get(key)
            .map(|ctx| ctx.snapshot(self.config.classifier_window))
            .unwrap_or_default()
    }

    /// Record one completed turn and apply every update rule.
    ///
    /// Creates the context if needed. Returns the updated context.
    pub fn record_turn(
        &self,
        key: &ConversationKey,
        utterance: &str,
        response: &str,
        classification: &Classification,
    ) -> ConversationContext {
        let lock = self.lock_for(key);
        let _guard = lock.lock();

        let mut ctx = self
            .store
            .get(key)
            .unwrap_or_else(|| ConversationContext::new(key.clone()));
        apply_turn(
            &mut ctx,
            Turn::new(utterance, response, classification.clone()),
            &self.config,
        );
        self.store.put(ctx.clone());

        debug!(
            conversation = %key,
            messages = ctx.message_count,
            depth = ctx.relationship_depth,
            "recorded turn"
        );
        ctx
    }

    /// Replace the user's preferences. Creates the context if needed.
    pub fn set_preferences(&self, key: &ConversationKey, preferences: UserPreferences) {
        let lock = self.lock_for(key);
        let _guard = lock.lock();
        let mut ctx = self
            .store
            .get(key)
            .unwrap_or_else(|| ConversationContext::new(key.clone()));
        ctx.user_preferences = preferences;
        ctx.updated_at = Utc::now();
        self.store.put(ctx);
    }

    /// The last `limit` turns, most recent last.
    ///
    /// # Errors
    ///
    /// [`HearthError::UnknownConversation`] when the key was never created
    /// or has been cleared.
    pub fn history(&self, key: &ConversationKey, limit: usize) -> Result<Vec<Turn>> {
        self.store
            .get(key)
            .map(|ctx| ctx.history(limit))
            .ok_or_else(|| HearthError::unknown_conversation(key.to_string()))
    }

    /// Remove a conversation. Idempotent; returns whether it existed.
    ///
    /// Waits for any update already holding the key's lock. The lock entry
    /// itself is kept while another caller still holds or waits on it, so
    /// later updates keep serializing on the same mutex.
    pub fn clear(&self, key: &ConversationKey) -> bool {
        let existed = {
            let lock = self.lock_for(key);
            let _guard = lock.lock();
            self.store.delete(key)
        };
        self.evict_lock(key);
        if existed {
            info!(conversation = %key, "cleared conversation context");
        }
        existed
    }

    /// Every conversation currently stored.
    pub fn conversations(&self) -> Vec<ConversationKey> {
        self.store.keys()
    }

    /// What the conversation reveals about the user.
    ///
    /// # Errors
    ///
    /// [`HearthError::UnknownConversation`] for an unknown key.
    pub fn insights(&self, key: &ConversationKey) -> Result<UserInsights> {
        self.store
            .get(key)
            .map(|ctx| insights(&ctx))
            .ok_or_else(|| HearthError::unknown_conversation(key.to_string()))
    }
}

impl std::fmt::Debug for ContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ── Update rules ────────────────────────────────────────────────────────

fn apply_turn(ctx: &mut ConversationContext, turn: Turn, config: &ContextConfig) {
    let category = turn.classification.category;

    ctx.message_count += 1;

    for topic in extract_topics(&turn.utterance) {
        ctx.topics_discussed.insert(topic.to_string());
    }

    ctx.recent_entities
        .merge_bounded(&turn.classification.entities, config.entity_window);

    if category != Category::FALLBACK {
        let count = ctx.category_counts.entry(category).or_insert(0);
        *count += 1;
        let prefs = &mut ctx.user_preferences.preferred_categories;
        if *count >= config.preference_threshold && !prefs.contains(&category) {
            prefs.push(category);
            if prefs.len() > config.max_preferred_categories {
                prefs.remove(0);
            }
        }
    }

    ctx.emotional_state = turn.classification.emotional_tone;

    let depth = (ctx.message_count as f32 * DEPTH_PER_MESSAGE
        + ctx.topics_discussed.len() as f32 * DEPTH_PER_TOPIC)
        .min(1.0);
    ctx.relationship_depth = ctx.relationship_depth.max(depth);

    ctx.rolling_turns.push_back(turn);
    while ctx.rolling_turns.len() > config.history_window {
        ctx.rolling_turns.pop_front();
    }

    ctx.updated_at = Utc::now();
}

// ── Insights ────────────────────────────────────────────────────────────

const DETAILED_WORDS: f32 = 15.0;
const HIGH_ENGAGEMENT_TURNS: u64 = 20;

fn insights(ctx: &ConversationContext) -> UserInsights {
    let turns = &ctx.rolling_turns;

    let mut topic_counts: BTreeMap<String, u32> = ctx
        .topics_discussed
        .iter()
        .map(|t| (t.clone(), 0))
        .collect();
    for turn in turns {
        for topic in extract_topics(&turn.utterance) {
            *topic_counts.entry(topic.to_string()).or_insert(0) += 1;
        }
    }
    let mut primary_interests: Vec<(String, u32)> = topic_counts
        .into_iter()
        .map(|(t, n)| (t, n.max(1)))
        .collect();
    primary_interests.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    primary_interests.truncate(5);

    let average_message_length = if turns.is_empty() {
        0.0
    } else {
        turns.iter().map(Turn::word_count).sum::<usize>() as f32 / turns.len() as f32
    };

    let mut tone_counts: BTreeMap<EmotionalTone, u32> = BTreeMap::new();
    for turn in turns {
        *tone_counts.entry(turn.classification.emotional_tone).or_insert(0) += 1;
    }
    let mut dominant_tones: Vec<(EmotionalTone, u32)> = tone_counts.into_iter().collect();
    dominant_tones.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    dominant_tones.truncate(3);

    let mut growth_opportunities = Vec::new();
    if ctx.relationship_depth < 0.5 {
        growth_opportunities.push("Explore deeper topics to build a stronger connection".to_string());
    }
    if ctx.topics_discussed.len() < 3 {
        growth_opportunities.push("Discover more of the user's interests".to_string());
    }

    UserInsights {
        message_count: ctx.message_count,
        relationship_depth: ctx.relationship_depth,
        primary_interests,
        average_message_length,
        communication_style: if average_message_length > DETAILED_WORDS {
            "detailed".into()
        } else {
            "concise".into()
        },
        engagement_level: if ctx.message_count > HIGH_ENGAGEMENT_TURNS {
            "high".into()
        } else {
            "moderate".into()
        },
        dominant_tones,
        growth_opportunities,
    }
}
