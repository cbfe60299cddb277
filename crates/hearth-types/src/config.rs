//! Configuration schema types.
//!
//! All structs support both `snake_case` and `camelCase` field names via
//! `#[serde(alias)]`, and every field has a default so a partial (or
//! empty) file yields a working configuration. Unknown fields are
//! silently ignored for forward compatibility.
//!
//! Files ending in `.toml` are parsed as TOML; anything else as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HearthError, Result};

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for the hearth pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HearthConfig {
    /// Classifier weights and thresholds.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Response strategy selection.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Conversation context windows.
    #[serde(default)]
    pub context: ContextConfig,

    /// Assistant persona and reply generation.
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl HearthConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::parse(&raw, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config text, choosing the format from `path`'s extension.
    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            Ok(toml::from_str(raw)?)
        } else {
            Ok(serde_json::from_str(raw)?)
        }
    }

    /// Load from an explicit path, or from the default location when
    /// `path` is `None`. A missing default file yields
    /// [`HearthConfig::default`].
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        for (name, value) in [
            ("classifier.pattern_weight", c.pattern_weight),
            ("classifier.floor", c.floor),
            ("classifier.fallback_confidence", c.fallback_confidence),
            ("classifier.recent_category_bonus", c.recent_category_bonus),
            ("classifier.preference_bonus", c.preference_bonus),
            ("strategy.clarify_below", self.strategy.clarify_below),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if c.pattern_weight == 0.0 {
            return Err(invalid("classifier.pattern_weight must be > 0".into()));
        }

        let ctx = &self.context;
        for (name, value) in [
            ("context.history_window", ctx.history_window),
            ("context.classifier_window", ctx.classifier_window),
            ("context.entity_window", ctx.entity_window),
            ("context.preference_threshold", ctx.preference_threshold as usize),
            ("context.max_preferred_categories", ctx.max_preferred_categories),
        ] {
            if value == 0 {
                return Err(invalid(format!("{name} must be > 0")));
            }
        }
        if ctx.classifier_window > ctx.history_window {
            return Err(invalid(format!(
                "context.classifier_window ({}) exceeds context.history_window ({})",
                ctx.classifier_window, ctx.history_window
            )));
        }
        if self.assistant.default_user.trim().is_empty() {
            return Err(invalid("assistant.default_user must not be empty".into()));
        }
        if self.assistant.backend_timeout_ms == 0 {
            return Err(invalid("assistant.backend_timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> HearthError {
    HearthError::ConfigInvalid { reason }
}

/// `~/.hearth/config.toml`, when a home directory is known.
#[cfg(feature = "native")]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hearth").join("config.toml"))
}

/// Without a platform home directory there is no default location.
#[cfg(not(feature = "native"))]
pub fn default_config_path() -> Option<PathBuf> {
    None
}

// ── Classifier ───────────────────────────────────────────────────────────

/// Weights and thresholds for the category classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Score contributed by every pattern match.
    #[serde(default = "default_pattern_weight", alias = "patternWeight")]
    pub pattern_weight: f32,

    /// Normalized score below which the fallback category is forced.
    #[serde(default = "default_floor")]
    pub floor: f32,

    /// Confidence assigned to the fallback category.
    #[serde(default = "default_fallback_confidence", alias = "fallbackConfidence")]
    pub fallback_confidence: f32,

    /// Bonus when the category was discussed in the recent window.
    #[serde(default = "default_recent_bonus", alias = "recentCategoryBonus")]
    pub recent_category_bonus: f32,

    /// Bonus when the category is one of the user's preferred categories.
    #[serde(default = "default_preference_bonus", alias = "preferenceBonus")]
    pub preference_bonus: f32,
}

fn default_pattern_weight() -> f32 {
    0.3
}
fn default_floor() -> f32 {
    0.3
}
fn default_fallback_confidence() -> f32 {
    0.5
}
fn default_recent_bonus() -> f32 {
    0.1
}
fn default_preference_bonus() -> f32 {
    0.15
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pattern_weight: default_pattern_weight(),
            floor: default_floor(),
            fallback_confidence: default_fallback_confidence(),
            recent_category_bonus: default_recent_bonus(),
            preference_bonus: default_preference_bonus(),
        }
    }
}

// ── Strategy ─────────────────────────────────────────────────────────────

/// Response strategy selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    /// Confidence below which every strategy becomes `clarifying`.
    #[serde(default = "default_clarify_below", alias = "clarifyBelow")]
    pub clarify_below: f32,
}

fn default_clarify_below() -> f32 {
    0.5
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            clarify_below: default_clarify_below(),
        }
    }
}

// ── Context ──────────────────────────────────────────────────────────────

/// Rolling-window sizes for conversation context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextConfig {
    /// Maximum number of turns kept per conversation.
    #[serde(default = "default_history_window", alias = "historyWindow")]
    pub history_window: usize,

    /// Number of most recent turns summarised for the classifier.
    #[serde(default = "default_classifier_window", alias = "classifierWindow")]
    pub classifier_window: usize,

    /// Maximum values kept per entity type in `recent_entities`.
    #[serde(default = "default_entity_window", alias = "entityWindow")]
    pub entity_window: usize,

    /// Turns in one category before it becomes a learned preference.
    #[serde(default = "default_preference_threshold", alias = "preferenceThreshold")]
    pub preference_threshold: u32,

    /// Maximum number of preferred categories kept.
    #[serde(default = "default_max_preferred", alias = "maxPreferredCategories")]
    pub max_preferred_categories: usize,
}

fn default_history_window() -> usize {
    50
}
fn default_classifier_window() -> usize {
    5
}
fn default_entity_window() -> usize {
    10
}
fn default_preference_threshold() -> u32 {
    3
}
fn default_max_preferred() -> usize {
    5
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            classifier_window: default_classifier_window(),
            entity_window: default_entity_window(),
            preference_threshold: default_preference_threshold(),
            max_preferred_categories: default_max_preferred(),
        }
    }
}

// ── Assistant ────────────────────────────────────────────────────────────

/// Template-set variant used by the responder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStyle {
    /// The template alone.
    #[default]
    Concise,
    /// Template plus a reflective line and, when the strategy asks for
    /// one, a follow-up question.
    Companion,
}

/// Persona and reply-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// Name the assistant uses for itself in backend prompts.
    #[serde(default = "default_name")]
    pub name: String,

    /// Template-set variant.
    #[serde(default)]
    pub style: ResponseStyle,

    /// Identity used when a caller supplies no user id.
    #[serde(default = "default_user", alias = "defaultUser")]
    pub default_user: String,

    /// Use the chat backend (when attached) for conversational replies.
    #[serde(default = "default_true", alias = "generativeReplies")]
    pub generative_replies: bool,

    /// Milliseconds a backend reply may take before the turn gives up and
    /// answers with the apology.
    #[serde(default = "default_backend_timeout_ms", alias = "backendTimeoutMs")]
    pub backend_timeout_ms: u64,
}

fn default_name() -> String {
    "Hearth".into()
}
fn default_user() -> String {
    "anonymous".into()
}
fn default_true() -> bool {
    true
}
fn default_backend_timeout_ms() -> u64 {
    120_000
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            style: ResponseStyle::default(),
            default_user: default_user(),
            generative_replies: default_true(),
            backend_timeout_ms: default_backend_timeout_ms(),
        }
    }
}
