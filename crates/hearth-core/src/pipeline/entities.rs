//! Entity extractor.
//!
//! Pulls typed slot values out of an utterance. Pattern-based kinds run
//! against the lowercased text and collect every non-overlapping match in
//! left-to-right order. Names and locations come from the raw text, since
//! they depend on capitalization.
//!
//! Kinds with no match are absent from the result, never present-but-empty.

use std::sync::OnceLock;

use hearth_types::classification::{Entities, EntityKind};
use regex::Regex;
use tracing::error;

use super::patterns::Captures;

/// Pattern source per entity kind.
const ENTITY_PATTERNS: &[(EntityKind, &str)] = &[
    (
        EntityKind::Time,
        r"\b(?:\d{1,2}:\d{2}(?:\s*[ap]m)?|\d{1,2}\s*[ap]m|tomorrow|today|tonight|next\s+week)\b",
    ),
    (
        EntityKind::Date,
        r"\b(?:\d{1,2}/\d{1,2}/\d{4}|\d{1,2}-\d{1,2}-\d{4}|tomorrow|today|next\s+(?:week|month|year|monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
    ),
    (EntityKind::Number, r"\b\d+\b"),
    (
        EntityKind::Color,
        r"\b(?:red|blue|green|yellow|orange|purple|pink|white|black|warm|cool)\b",
    ),
    (
        EntityKind::Device,
        r"\b(?:light|lamp|tv|television|speaker|thermostat|door|window)s?\b",
    ),
    (
        EntityKind::Room,
        r"\b(?:living\s+room|dining\s+room|bedroom|kitchen|bathroom|office|garage|basement|hallway)\b",
    ),
    (
        EntityKind::FoodItems,
        r"\b(?:chicken|beef|pork|fish|pasta|rice|vegetables|salad|soup|cake|bread)\b",
    ),
    (
        EntityKind::Services,
        r"\b(?:spotify|music|hue|lights|calendar|home\s+assistant)\b",
    ),
    (
        EntityKind::Technologies,
        r"\b(?:python|javascript|rust|html|css|sql|react|node|api|database)\b",
    ),
    (
        EntityKind::TimeReferences,
        r"\b(?:today|tomorrow|yesterday|next\s+week|this\s+week|morning|afternoon|evening|night)\b",
    ),
];

/// Words after which a capitalized word reads as a place.
const LOCATION_PREPOSITIONS: &[&str] = &["in", "at", "from", "to"];

/// Compiled entity patterns.
fn compiled() -> &'static [(EntityKind, Regex)] {
    static COMPILED: OnceLock<Vec<(EntityKind, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        ENTITY_PATTERNS
            .iter()
            .filter_map(|(kind, source)| match Regex::new(source) {
                Ok(re) => Some((*kind, re)),
                Err(e) => {
                    error!(kind = %kind, error = %e, "skipping malformed entity pattern");
                    None
                }
            })
            .collect()
    })
}

/// Stateless entity extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every entity kind from `text`.
    pub fn extract(&self, text: &str) -> Entities {
        let mut entities = Entities::new();
        if text.trim().is_empty() {
            return entities;
        }

        let lowered = text.to_lowercase();
        for (kind, pattern) in compiled() {
            let values: Vec<String> = pattern
                .find_iter(&lowered)
                .map(|m| m.as_str().to_string())
                .collect();
            entities.insert(*kind, values);
        }

        entities.insert(EntityKind::Names, capitalized_words(text));
        entities.insert(EntityKind::Locations, locations(text));
        entities
    }

    /// Extract entities and attach classifier captures as `primary` /
    /// `secondary`.
    pub fn extract_with_captures(&self, text: &str, captures: Option<&Captures>) -> Entities {
        let mut entities = self.extract(text);
        if let Some(caps) = captures {
            entities.push(EntityKind::Primary, caps.primary.clone());
            if let Some(secondary) = &caps.secondary {
                entities.push(EntityKind::Secondary, secondary.clone());
            }
        }
        entities
    }
}

/// Strip surrounding punctuation, keeping inner apostrophes.
fn bare(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .trim_matches('\'')
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Capitalized words longer than two characters, skipping the first word
/// (sentence-initial capitals say nothing about names).
fn capitalized_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .skip(1)
        .map(bare)
        .filter(|w| w.chars().count() > 2 && starts_uppercase(w))
        .map(str::to_string)
        .collect()
}

/// Capitalized words that directly follow a location preposition.
fn locations(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().map(bare).collect();
    words
        .windows(2)
        .filter(|pair| {
            LOCATION_PREPOSITIONS.contains(&pair[0].to_lowercase().as_str())
                && starts_uppercase(pair[1])
        })
        .map(|pair| pair[1].to_string())
        .collect()
}
