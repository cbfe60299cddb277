//! Pattern classifier.
//!
//! Scores every category against the normalized utterance, picks the
//! winner, resolves its intent, extracts entities, derives tone, urgency
//! and complexity, and attaches tools and a response strategy.
//!
//! # Scoring
//!
//! 1. Each category pattern contributes `pattern_weight` per
//!    non-overlapping match.
//! 2. Each token that is a keyword hint adds the hint's weight to its
//!    category.
//! 3. Scores are divided by the highest score and capped at 1.0.
//! 4. The highest normalized score wins; ties go to the category declared
//!    first. A winner below `floor` is replaced by the fallback category.
//! 5. Context adds a bonus when the winner was discussed recently or is a
//!    preferred category, clamped to 1.0.

use hearth_types::classification::{Category, Classification};
use hearth_types::config::ClassifierConfig;
use hearth_types::context::ContextSnapshot;
use tracing::debug;

use super::entities::EntityExtractor;
use super::patterns::PatternLibrary;
use super::signals;
use super::strategy::{StrategySelector, required_tools};
use super::traits::UtteranceClassifier;

/// Per-category scores for one utterance, indexed like [`Category::ALL`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores {
    /// Raw accumulated scores.
    pub raw: [f32; Category::ALL.len()],
    /// Scores divided by the maximum, capped at 1.0.
    pub normalized: [f32; Category::ALL.len()],
}

impl CategoryScores {
    /// Highest normalized score and its category (first declared on ties).
    pub fn best(&self) -> (Category, f32) {
        let mut best = (Category::FALLBACK, 0.0_f32);
        for (i, &score) in self.normalized.iter().enumerate() {
            if score > best.1 {
                best = (Category::ALL[i], score);
            }
        }
        best
    }

    /// Normalized score of `category`.
    pub fn score(&self, category: Category) -> f32 {
        self.normalized
            .get(category.declaration_index())
            .copied()
            .unwrap_or(0.0)
    }
}

/// Level 0 classifier built on the static pattern library.
pub struct PatternClassifier {
    library: &'static PatternLibrary,
    extractor: EntityExtractor,
    strategy: StrategySelector,
    config: ClassifierConfig,
}

impl PatternClassifier {
    /// Create a classifier over the built-in pattern library.
    pub fn new(config: ClassifierConfig, strategy: StrategySelector) -> Self {
        Self {
            library: PatternLibrary::builtin(),
            extractor: EntityExtractor::new(),
            strategy,
            config,
        }
    }

    /// The strategy selector used for attached strategies.
    pub fn strategy(&self) -> &StrategySelector {
        &self.strategy
    }

    /// Score every category against already-normalized text.
    pub fn score_categories(&self, normalized: &str) -> CategoryScores {
        let mut raw = [0.0_f32; Category::ALL.len()];

        for (i, category) in Category::ALL.iter().enumerate() {
            let matches: usize = self
                .library
                .category_patterns(*category)
                .iter()
                .map(|p| p.find_iter(normalized).count())
                .sum();
            raw[i] += matches as f32 * self.config.pattern_weight;
        }

        for token in signals::tokens(normalized) {
            if let Some((category, weight)) = self.library.keyword_hint(&token) {
                raw[category.declaration_index()] += weight;
            }
        }

        let max = raw.iter().copied().fold(0.0_f32, f32::max);
        let divisor = if max > 0.0 { max } else { 1.0 };
        let normalized = raw.map(|s| (s / divisor).min(1.0));

        CategoryScores { raw, normalized }
    }

    fn fallback(&self) -> Classification {
        let mut c = Classification::fallback(self.config.fallback_confidence);
        c.response_strategy = self.strategy.select(c.category, c.intent, c.confidence);
        c
    }

    fn context_bonus(&self, category: Category, context: Option<&ContextSnapshot>) -> f32 {
        let Some(ctx) = context else {
            return 0.0;
        };
        let mut bonus = 0.0;
        if ctx.recently_discussed(category) {
            bonus += self.config.recent_category_bonus;
        }
        if ctx.prefers(category) {
            bonus += self.config.preference_bonus;
        }
        bonus
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default(), StrategySelector::default())
    }
}

/// Lowercase and trim.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl UtteranceClassifier for PatternClassifier {
    fn classify(&self, text: &str, context: Option<&ContextSnapshot>) -> Classification {
        let normalized = normalize(text);
        if normalized.is_empty() {
            debug!("empty utterance, using fallback category");
            return self.fallback();
        }

        let scores = self.score_categories(&normalized);
        let (category, top) = scores.best();
        if top < self.config.floor {
            debug!(top, "no category above floor, using fallback category");
            let mut c = self.fallback();
            c.entities = self.extractor.extract(text);
            c.emotional_tone = signals::emotional_tone(&normalized);
            c.urgency = signals::urgency(&normalized);
            c.complexity = signals::complexity(&normalized);
            return c;
        }

        let intent = self.library.resolve_intent(category, &normalized);
        let captures = self.library.captures(category, &normalized);
        let entities = self.extractor.extract_with_captures(text, captures.as_ref());

        let confidence = (top + self.context_bonus(category, context)).clamp(0.0, 1.0);
        let response_strategy = self.strategy.select(category, intent, confidence);

        debug!(
            category = %category,
            intent = %intent,
            confidence,
            entity_kinds = entities.len(),
            "classified utterance"
        );

        Classification {
            category,
            intent,
            confidence,
            entities,
            emotional_tone: signals::emotional_tone(&normalized),
            urgency: signals::urgency(&normalized),
            complexity: signals::complexity(&normalized),
            required_tools: required_tools(category, intent),
            response_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_types::classification::{Approach, EntityKind, Intent, Level, Tool};

    fn classify(text: &str) -> Classification {
        PatternClassifier::default().classify(text, None)
    }

    #[test]
    fn play_some_jazz() {
        let c = classify("play some jazz");
        assert_eq!(c.category, Category::MusicControl);
        assert_eq!(c.intent, Intent::Play);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.entities.primary(), Some("some jazz"));
        assert!(c.required_tools.contains(&Tool::MusicPlayer));
        assert_eq!(c.response_strategy.approach, Approach::Executing);
    }

    #[test]
    fn kitchen_light_goes_to_lighting() {
        let c = classify("turn off the kitchen light");
        assert_eq!(c.category, Category::LightingControl);
        assert_eq!(c.intent, Intent::TurnOff);
        assert_eq!(c.entities.first(EntityKind::Device), Some("light"));
        assert_eq!(c.entities.first(EntityKind::Room), Some("kitchen"));
    }

    #[test]
    fn empty_input_is_fallback() {
        for text in ["", "   ", "\n\t"] {
            let c = classify(text);
            assert_eq!(c.category, Category::Casual);
            assert_eq!(c.intent, Intent::Unknown);
            assert_eq!(c.confidence, 0.5);
            assert!(c.entities.is_empty());
        }
    }

    #[test]
    fn unmatched_text_is_fallback() {
        let c = classify("zxqv blorp");
        assert_eq!(c.category, Category::Casual);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn ties_go_to_first_declared() {
        let classifier = PatternClassifier::default();
        let scores = classifier.score_categories("turn off the kitchen");
        // lighting does not match; home automation and cooking tie.
        assert_eq!(scores.score(Category::HomeAutomation), 1.0);
        assert_eq!(scores.score(Category::Cooking), 1.0);
        assert_eq!(scores.best().0, Category::HomeAutomation);
    }

    #[test]
    fn greeting_and_goodbye() {
        let hello = classify("Hello there");
        assert_eq!(hello.category, Category::Greeting);
        assert_eq!(hello.intent, Intent::Hello);
        let bye = classify("ok, goodbye");
        assert_eq!(bye.category, Category::Goodbye);
        assert_eq!(bye.intent, Intent::Goodbye);
    }

    #[test]
    fn meeting_question_stays_on_calendar() {
        let c = classify("When is my next meeting?");
        assert_eq!(c.category, Category::CalendarManagement);
        assert_eq!(c.intent, Intent::QueryCalendar);
        assert_eq!(c.urgency, Level::Medium);
    }

    #[test]
    fn calls_and_directions() {
        let call = classify("call Maria");
        assert_eq!(call.category, Category::Contacts);
        assert_eq!(call.intent, Intent::Call);
        assert_eq!(call.entities.first(EntityKind::Names), Some("Maria"));
        assert!(call.required_tools.contains(&Tool::Contacts));

        let lookup = classify("find the phone number for Maria");
        assert_eq!(lookup.category, Category::Contacts);
        assert_eq!(lookup.intent, Intent::FindContact);

        let route = classify("get directions to Boston");
        assert_eq!(route.category, Category::Navigation);
        assert_eq!(route.intent, Intent::Directions);
        assert_eq!(route.entities.first(EntityKind::Locations), Some("Boston"));
        assert!(route.required_tools.contains(&Tool::Maps));

        let nearby = classify("find coffee shops nearby");
        assert_eq!(nearby.category, Category::Navigation);
        assert_eq!(nearby.intent, Intent::FindNearby);
    }

    #[test]
    fn make_it_brighter_is_lighting() {
        let c = classify("make it brighter");
        assert_eq!(c.category, Category::LightingControl);
        assert_eq!(c.intent, Intent::AdjustBrightness);
    }

    #[test]
    fn feelings_are_emotional() {
        let c = classify("I feel so sad today");
        assert_eq!(c.category, Category::Emotional);
        assert_eq!(c.emotional_tone, hearth_types::classification::EmotionalTone::Negative);
        assert_eq!(c.response_strategy.approach, Approach::Empathetic);
    }

    #[test]
    fn context_bonus_is_clamped() {
        let classifier = PatternClassifier::default();
        let ctx = ContextSnapshot {
            recent_categories: vec![Category::MusicControl],
            preferred_categories: vec![Category::MusicControl],
            ..Default::default()
        };
        let c = classifier.classify("play some jazz", Some(&ctx));
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = PatternClassifier::default();
        let a = classifier.classify("schedule a meeting for tomorrow at 3pm", None);
        let b = classifier.classify("schedule a meeting for tomorrow at 3pm", None);
        assert_eq!(a, b);
        assert_eq!(a.category, Category::CalendarManagement);
        assert_eq!(a.intent, Intent::Schedule);
    }

    #[test]
    fn any_match_clears_the_floor() {
        let config = ClassifierConfig {
            floor: 1.0,
            ..Default::default()
        };
        let classifier = PatternClassifier::new(config, StrategySelector::default());
        // The winner is normalized to 1.0 whenever anything matched.
        let c = classifier.classify("play some jazz", None);
        assert_eq!(c.category, Category::MusicControl);
        let c = classifier.classify("zxqv", None);
        assert_eq!(c.category, Category::Casual);
    }
}
