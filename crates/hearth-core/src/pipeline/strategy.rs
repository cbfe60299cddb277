//! Response strategy selector and tool lookup.
//!
//! Both are static tables keyed by category (and, for a few rows, intent).
//! The one dynamic rule is the low-confidence override: below
//! `clarify_below` every strategy becomes `clarifying` with a follow-up,
//! whatever the table says.

use std::collections::BTreeSet;

use hearth_types::classification::{
    Approach, Category, Intent, ResponseLength, Strategy, Tone, Tool,
};
use hearth_types::config::StrategyConfig;

const fn row(
    approach: Approach,
    tone: Tone,
    length: ResponseLength,
    include_followup: bool,
    use_tools: bool,
) -> Strategy {
    Strategy {
        approach,
        tone,
        length,
        include_followup,
        use_tools,
    }
}

const DEFAULT: Strategy = row(
    Approach::Conversational,
    Tone::Friendly,
    ResponseLength::Medium,
    true,
    false,
);

const EXECUTING: Strategy = row(
    Approach::Executing,
    Tone::Efficient,
    ResponseLength::Short,
    false,
    true,
);

/// Table row for a category / intent pair before the confidence override.
fn base_strategy(category: Category, intent: Intent) -> Strategy {
    use Approach as A;
    use ResponseLength as L;

    match (category, intent) {
        (Category::Question, Intent::Explanation) => {
            row(A::Instructional, Tone::Friendly, L::Detailed, true, false)
        }
        (Category::Question, Intent::Factual) => {
            row(A::Informative, Tone::Professional, L::Medium, true, false)
        }
        (Category::Personal, Intent::Support) | (Category::Emotional, _) => {
            row(A::Empathetic, Tone::Supportive, L::Long, true, false)
        }
        (Category::Technical, _) => {
            row(A::Analytical, Tone::Professional, L::Detailed, false, false)
        }
        (Category::Creative, _) => {
            row(A::Inspirational, Tone::Encouraging, L::Medium, true, false)
        }
        (Category::TaskRequest, _) => row(A::Helpful, Tone::Efficient, L::Focused, true, true),
        (Category::Cooking, _) => row(A::Instructional, Tone::Friendly, L::Detailed, true, true),
        (Category::Greeting, _) => row(A::Welcoming, Tone::Warm, L::Short, true, false),
        (Category::Goodbye, _) => row(A::Welcoming, Tone::Warm, L::Short, false, false),
        (Category::InformationQuery, _) => {
            row(A::Informative, Tone::Professional, L::Medium, true, true)
        }
        (Category::SystemControl, _) => row(A::Helpful, Tone::Efficient, L::Short, false, true),
        (c, _) if c.is_system_command() => EXECUTING,
        _ => DEFAULT,
    }
}

/// Picks the reply shape for a classification.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    clarify_below: f32,
}

impl StrategySelector {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            clarify_below: config.clarify_below,
        }
    }

    /// Strategy for `category` / `intent` at `confidence`.
    pub fn select(&self, category: Category, intent: Intent, confidence: f32) -> Strategy {
        let mut strategy = base_strategy(category, intent);
        if confidence < self.clarify_below {
            strategy.approach = Approach::Clarifying;
            strategy.include_followup = true;
        }
        strategy
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(&StrategyConfig::default())
    }
}

/// Tools a category / intent pair may need.
pub fn required_tools(category: Category, intent: Intent) -> BTreeSet<Tool> {
    let tool = match (category, intent) {
        (Category::Cooking, Intent::Recipe) => Some(Tool::RecipeSearch),
        (Category::TaskRequest, Intent::Search) => Some(Tool::WebSearch),
        (Category::TaskRequest, Intent::Calculate) => Some(Tool::Calculator),
        (Category::TaskRequest, Intent::Create) => Some(Tool::ContentGenerator),
        (Category::Creative, Intent::Write) => Some(Tool::TextGenerator),
        (Category::Creative, Intent::Design) => Some(Tool::ImageGenerator),
        (Category::MusicControl, _) => Some(Tool::MusicPlayer),
        (Category::LightingControl | Category::HomeAutomation, _) => Some(Tool::SmartHome),
        (Category::CalendarManagement, _) => Some(Tool::Calendar),
        (Category::Contacts, _) => Some(Tool::Contacts),
        (Category::Navigation, _) => Some(Tool::Maps),
        (Category::InformationQuery, _) => Some(Tool::WebSearch),
        (Category::SystemControl, Intent::Settings) => Some(Tool::Configuration),
        _ => None,
    };
    tool.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotional_is_empathetic() {
        let s = StrategySelector::default().select(Category::Emotional, Intent::Unknown, 0.9);
        assert_eq!(s.approach, Approach::Empathetic);
        assert_eq!(s.tone, Tone::Supportive);
        assert_eq!(s.length, ResponseLength::Long);
        assert!(s.include_followup);
    }

    #[test]
    fn technical_has_no_followup() {
        let s = StrategySelector::default().select(Category::Technical, Intent::Code, 1.0);
        assert_eq!(s.approach, Approach::Analytical);
        assert!(!s.include_followup);
    }

    #[test]
    fn system_commands_execute_with_tools() {
        for c in [
            Category::MusicControl,
            Category::LightingControl,
            Category::CalendarManagement,
            Category::HomeAutomation,
            Category::Contacts,
            Category::Navigation,
        ] {
            let s = StrategySelector::default().select(c, Intent::Unknown, 1.0);
            assert_eq!(s, EXECUTING, "{c}");
        }
    }

    #[test]
    fn unlisted_category_uses_default() {
        let s = StrategySelector::default().select(Category::Casual, Intent::Unknown, 0.9);
        assert_eq!(s, DEFAULT);
    }

    #[test]
    fn low_confidence_forces_clarifying() {
        let s = StrategySelector::default().select(Category::Technical, Intent::Code, 0.3);
        assert_eq!(s.approach, Approach::Clarifying);
        assert!(s.include_followup);

        let at_threshold = StrategySelector::default().select(Category::Technical, Intent::Code, 0.5);
        assert_eq!(at_threshold.approach, Approach::Analytical);
    }

    #[test]
    fn tool_table() {
        assert_eq!(
            required_tools(Category::Cooking, Intent::Recipe),
            BTreeSet::from([Tool::RecipeSearch])
        );
        assert!(required_tools(Category::Cooking, Intent::CookingHelp).is_empty());
        assert_eq!(
            required_tools(Category::LightingControl, Intent::TurnOff),
            BTreeSet::from([Tool::SmartHome])
        );
        assert_eq!(
            required_tools(Category::SystemControl, Intent::Settings),
            BTreeSet::from([Tool::Configuration])
        );
        assert_eq!(
            required_tools(Category::Contacts, Intent::Call),
            BTreeSet::from([Tool::Contacts])
        );
        assert_eq!(
            required_tools(Category::Navigation, Intent::Directions),
            BTreeSet::from([Tool::Maps])
        );
        assert!(required_tools(Category::Greeting, Intent::Hello).is_empty());
    }
}
