//! Conversation context types.
//!
//! A [`ConversationContext`] is the rolling state kept for one
//! (user, conversation) pair: a bounded window of recent [`Turn`]s, the
//! topics and entities seen so far, a derived relationship-depth signal
//! and the user's preferences. The pipeline only ever reads it through a
//! [`ContextSnapshot`]; mutation is owned by the context manager in
//! `hearth-core`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::{Category, Classification, EmotionalTone, Entities, Intent, ResponseLength, Tone};

// ── Identity ─────────────────────────────────────────────────────────────

/// Identity of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    /// The user who owns the conversation.
    pub user_id: String,
    /// The conversation identifier.
    pub conversation_id: String,
}

impl ConversationKey {
    /// Create a key from its parts.
    pub fn new(user_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: conversation_id.into(),
        }
    }

    /// Create a key with a freshly minted conversation id.
    pub fn fresh(user_id: impl Into<String>) -> Self {
        Self::new(user_id, uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.conversation_id)
    }
}

// ── Turn ─────────────────────────────────────────────────────────────────

/// One user utterance together with the assistant's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// What the user said.
    pub utterance: String,
    /// What the assistant replied.
    pub response: String,
    /// How the utterance was classified.
    pub classification: Classification,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    pub fn new(
        utterance: impl Into<String>,
        response: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            utterance: utterance.into(),
            response: response.into(),
            classification,
            timestamp: Utc::now(),
        }
    }

    /// Number of whitespace-separated words in the utterance.
    pub fn word_count(&self) -> usize {
        self.utterance.split_whitespace().count()
    }
}

// ── Preferences ──────────────────────────────────────────────────────────

/// What the user prefers, learned or set explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Categories the user engages with often (oldest first, bounded).
    #[serde(default)]
    pub preferred_categories: Vec<Category>,

    /// Preferred reply tone, if the user stated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_tone: Option<Tone>,

    /// Preferred reply length, if the user stated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_length: Option<ResponseLength>,

    /// Free-form preferences set by collaborators.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl UserPreferences {
    /// Whether `category` is one of the preferred categories.
    pub fn prefers(&self, category: Category) -> bool {
        self.preferred_categories.contains(&category)
    }
}

// ── Context ──────────────────────────────────────────────────────────────

/// Rolling per-conversation state.
///
/// Created lazily with every field at its zero value, mutated after each
/// turn and only removed by an explicit clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Which conversation this is.
    pub key: ConversationKey,

    /// Turns recorded so far (not bounded by the window).
    pub message_count: u64,

    /// The most recent turns, oldest first.
    pub rolling_turns: VecDeque<Turn>,

    /// Topic labels seen in any turn.
    pub topics_discussed: BTreeSet<String>,

    /// Entities from recent turns, bounded per type.
    pub recent_entities: Entities,

    /// Engagement heuristic in `0.0..=1.0`; never decreases.
    pub relationship_depth: f32,

    /// Learned and explicit preferences.
    pub user_preferences: UserPreferences,

    /// How many turns fell into each category.
    #[serde(default)]
    pub category_counts: BTreeMap<Category, u32>,

    /// Tone of the latest turn.
    #[serde(default)]
    pub emotional_state: EmotionalTone,

    /// When the context was created.
    pub created_at: DateTime<Utc>,

    /// When the context last changed.
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// A fresh context with every field at its default.
    pub fn new(key: ConversationKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            message_count: 0,
            rolling_turns: VecDeque::new(),
            topics_discussed: BTreeSet::new(),
            recent_entities: Entities::new(),
            relationship_depth: 0.0,
            user_preferences: UserPreferences::default(),
            category_counts: BTreeMap::new(),
            emotional_state: EmotionalTone::Neutral,
            created_at: now,
            updated_at: now,
        }
    }

    /// The last `limit` turns, most recent last.
    pub fn history(&self, limit: usize) -> Vec<Turn> {
        let start = self.rolling_turns.len().saturating_sub(limit);
        self.rolling_turns.iter().skip(start).cloned().collect()
    }

    /// Summarise the last `window` turns for the classifier.
    pub fn snapshot(&self, window: usize) -> ContextSnapshot {
        let start = self.rolling_turns.len().saturating_sub(window);
        let recent: Vec<&Turn> = self.rolling_turns.iter().skip(start).collect();

        let mut recent_entities = Entities::new();
        for turn in &recent {
            recent_entities.merge_bounded(&turn.classification.entities, usize::MAX);
        }

        ContextSnapshot {
            message_count: self.message_count,
            relationship_depth: self.relationship_depth,
            recent_categories: recent.iter().map(|t| t.classification.category).collect(),
            recent_intents: recent.iter().map(|t| t.classification.intent).collect(),
            recent_entities,
            preferred_categories: self.user_preferences.preferred_categories.clone(),
            topics: self.topics_discussed.iter().cloned().collect(),
            last_interaction: recent.last().map(|t| t.timestamp),
        }
    }
}

/// Read-only view of a conversation handed to the pipeline stages.
///
/// `ContextSnapshot::default()` is the empty context of a brand-new
/// conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Turns recorded so far.
    pub message_count: u64,
    /// Relationship depth at snapshot time.
    pub relationship_depth: f32,
    /// Categories of the recent window, oldest first.
    pub recent_categories: Vec<Category>,
    /// Intents of the recent window, oldest first.
    pub recent_intents: Vec<Intent>,
    /// Entities aggregated over the recent window.
    pub recent_entities: Entities,
    /// The user's preferred categories.
    pub preferred_categories: Vec<Category>,
    /// Topics discussed so far.
    pub topics: Vec<String>,
    /// Timestamp of the latest turn.
    pub last_interaction: Option<DateTime<Utc>>,
}

impl ContextSnapshot {
    /// Whether `category` appeared in the recent window.
    pub fn recently_discussed(&self, category: Category) -> bool {
        self.recent_categories.contains(&category)
    }

    /// Whether `category` is a preferred category.
    pub fn prefers(&self, category: Category) -> bool {
        self.preferred_categories.contains(&category)
    }
}

// ── Insights ─────────────────────────────────────────────────────────────

/// Summary of what a conversation reveals about the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInsights {
    pub message_count: u64,
    pub relationship_depth: f32,
    /// Up to five topics, most frequent first.
    pub primary_interests: Vec<(String, u32)>,
    pub average_message_length: f32,
    /// `"detailed"` or `"concise"`.
    pub communication_style: String,
    /// `"high"` or `"moderate"`.
    pub engagement_level: String,
    /// Up to three tones, most frequent first.
    pub dominant_tones: Vec<(EmotionalTone, u32)>,
    pub growth_opportunities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::EntityKind;

    fn turn(category: Category, room: &str) -> Turn {
        let mut c = Classification::fallback(0.9);
        c.category = category;
        c.entities.push(EntityKind::Room, room);
        Turn::new("hello there", "hi", c)
    }

    #[test]
    fn key_display_and_fresh() {
        let key = ConversationKey::new("u1", "c1");
        assert_eq!(key.to_string(), "u1/c1");
        let a = ConversationKey::fresh("u1");
        let b = ConversationKey::fresh("u1");
        assert_ne!(a.conversation_id, b.conversation_id);
    }

    #[test]
    fn new_context_is_zeroed() {
        let ctx = ConversationContext::new(ConversationKey::new("u", "c"));
        assert_eq!(ctx.message_count, 0);
        assert!(ctx.rolling_turns.is_empty());
        assert!(ctx.topics_discussed.is_empty());
        assert!(ctx.recent_entities.is_empty());
        assert_eq!(ctx.relationship_depth, 0.0);
        assert!(ctx.user_preferences.preferred_categories.is_empty());
    }

    #[test]
    fn snapshot_covers_only_window() {
        let mut ctx = ConversationContext::new(ConversationKey::new("u", "c"));
        ctx.rolling_turns.push_back(turn(Category::Cooking, "kitchen"));
        ctx.rolling_turns.push_back(turn(Category::MusicControl, "office"));
        ctx.rolling_turns.push_back(turn(Category::LightingControl, "bedroom"));

        let snap = ctx.snapshot(2);
        assert_eq!(
            snap.recent_categories,
            vec![Category::MusicControl, Category::LightingControl]
        );
        assert!(!snap.recently_discussed(Category::Cooking));
        assert_eq!(
            snap.recent_entities.get(EntityKind::Room).unwrap(),
            &["office".to_string(), "bedroom".to_string()]
        );
        assert!(snap.last_interaction.is_some());
    }

    #[test]
    fn history_returns_most_recent_last() {
        let mut ctx = ConversationContext::new(ConversationKey::new("u", "c"));
        for room in ["a", "b", "c"] {
            ctx.rolling_turns.push_back(turn(Category::Casual, room));
        }
        let h = ctx.history(2);
        assert_eq!(h.len(), 2);
        assert_eq!(h[1].classification.entities.first(EntityKind::Room), Some("c"));
        assert_eq!(ctx.history(10).len(), 3);
    }

    #[test]
    fn empty_snapshot_default() {
        let snap = ContextSnapshot::default();
        assert_eq!(snap.message_count, 0);
        assert!(!snap.recently_discussed(Category::Casual));
        assert!(!snap.prefers(Category::Casual));
    }

    #[test]
    fn context_json_roundtrip() {
        let mut ctx = ConversationContext::new(ConversationKey::new("u", "c"));
        ctx.rolling_turns.push_back(turn(Category::Greeting, "hall"));
        ctx.topics_discussed.insert("food".into());
        ctx.category_counts.insert(Category::Greeting, 1);
        let json = serde_json::to_string(&ctx).unwrap();
        let back: ConversationContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }
}
