//! Derived utterance signals: emotional tone, urgency, complexity.
//!
//! All three are keyword counts over whole lowercase tokens, so "snow"
//! never counts as "now" and "unhappy" never counts as "happy".

use hearth_types::classification::{Complexity, EmotionalTone, Level, Urgency};

const POSITIVE_WORDS: &[&str] = &[
    "happy", "excited", "great", "awesome", "love", "wonderful", "amazing",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "angry", "frustrated", "worried", "hate", "terrible", "awful",
];

const URGENT_WORDS: &[&str] = &[
    "urgent", "asap", "immediately", "now", "quickly", "emergency", "help",
];

const COMPLEX_WORDS: &[&str] = &[
    "analyze", "compare", "detailed", "comprehensive", "multiple", "various", "complex",
];

const SIMPLE_WORDS: &[&str] = &["simple", "quick", "basic", "easy", "just"];

/// Lowercase tokens with surrounding punctuation removed.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
}

fn count_in(text: &str, vocabulary: &[&str]) -> usize {
    tokens(text).filter(|t| vocabulary.contains(&t.as_str())).count()
}

/// Positive when positive words outnumber negative ones, negative in the
/// opposite case, neutral on a tie.
pub fn emotional_tone(text: &str) -> EmotionalTone {
    let positive = count_in(text, POSITIVE_WORDS);
    let negative = count_in(text, NEGATIVE_WORDS);
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => EmotionalTone::Positive,
        std::cmp::Ordering::Less => EmotionalTone::Negative,
        std::cmp::Ordering::Equal => EmotionalTone::Neutral,
    }
}

/// High on an urgency keyword or `!`, medium on `?`, low otherwise.
pub fn urgency(text: &str) -> Urgency {
    if text.contains('!') || count_in(text, URGENT_WORDS) > 0 {
        Level::High
    } else if text.contains('?') {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Keyword balance first, then word count.
pub fn complexity(text: &str) -> Complexity {
    let complex = count_in(text, COMPLEX_WORDS);
    let simple = count_in(text, SIMPLE_WORDS);
    let words = text.split_whitespace().count();

    if complex > simple || words > 50 {
        Level::High
    } else if simple > complex || words < 10 {
        Level::Low
    } else {
        Level::Medium
    }
}
