//! Template responder.
//!
//! Renders a reply from a template family keyed by category and
//! sub-intent. Placeholders of the form `{name}` are filled from entities
//! with fixed defaults, so a rendered reply never contains an unresolved
//! placeholder. Which template of a family is used comes from the
//! injected [`RandomSource`].

use std::borrow::Cow;
use std::sync::Arc;

use hearth_types::classification::{Approach, Category, Classification, Entities, EntityKind, Intent};
use hearth_types::config::ResponseStyle;
use hearth_types::context::ContextSnapshot;
use tracing::warn;

use super::random::ThreadRandom;
use super::subintent::{self, SubIntent};
use super::traits::RandomSource;

// ── Templates ───────────────────────────────────────────────────────────

fn templates(category: Category, sub: SubIntent) -> &'static [&'static str] {
    use SubIntent as S;

    match (category, sub) {
        (Category::MusicControl, S::Pause) => &[
            "Music paused.",
            "Pausing your music now.",
            "Your music is on hold.",
        ],
        (Category::MusicControl, S::Volume) => &[
            "Volume set to {level}.",
            "Adjusting the volume to {level}.",
            "Changed the volume to {level}.",
        ],
        (Category::MusicControl, S::NextTrack) => &[
            "Skipping to the next track.",
            "Here's the next song.",
        ],
        (Category::MusicControl, S::PreviousTrack) => &[
            "Going back to the previous track.",
            "Playing the previous song again.",
        ],
        (Category::MusicControl, _) => &[
            "Playing {music} for you now.",
            "Starting {music}. Enjoy!",
            "Here comes {music}.",
        ],

        (Category::LightingControl, S::LightOff) => &[
            "Turning off the {device}.",
            "Switched off the {device} in the {room}.",
            "Done, I turned off the {device}.",
        ],
        (Category::LightingControl, S::Brightness) => &[
            "Setting the {device} to {level}% brightness.",
            "Brightness for the {device} is now {level}%.",
            "Adjusted the {room} {device} to {level}%.",
        ],
        (Category::LightingControl, S::Color) => &[
            "Changing the {device} to {color}.",
            "Switched the {device} to {color}.",
        ],
        (Category::LightingControl, _) => &[
            "Turning on the {device} now.",
            "Switched on the {device} in the {room}.",
            "Lights up! I turned on the {device}.",
        ],

        (Category::CalendarManagement, S::ScheduleEvent) => &[
            "I've scheduled {event} for {time}.",
            "Added {event} to your calendar for {time}.",
            "Done, {event} is booked for {time}.",
        ],
        (Category::CalendarManagement, S::CancelEvent) => &[
            "I've cancelled {event}.",
            "Done, {event} is off your calendar.",
        ],
        (Category::CalendarManagement, _) => &[
            "Let me check what's on your calendar.",
            "Pulling up your upcoming events.",
            "Here's what your schedule looks like for {time}.",
        ],

        (Category::HomeAutomation, S::Temperature) => &[
            "Setting the thermostat to {temperature}.",
            "The temperature is now set to {temperature}.",
        ],
        (Category::HomeAutomation, S::Lock) => &[
            "Locking the {device} now.",
            "Locked the {device}.",
        ],
        (Category::HomeAutomation, S::Unlock) => &[
            "Unlocking the {device}.",
            "Unlocked the {device}.",
        ],
        (Category::HomeAutomation, S::Arm) => &[
            "Security system armed.",
            "Arming the security system now.",
        ],
        (Category::HomeAutomation, S::Disarm) => &[
            "Security system disarmed.",
            "Disarming the security system now.",
        ],
        (Category::HomeAutomation, S::DeviceStatus) => &[
            "Checking the status of the {device}.",
            "Let me see how the {device} is doing.",
        ],
        (Category::HomeAutomation, _) => &[
            "I've adjusted the {device} as requested.",
            "The {device} has been {action}.",
            "Done, I {action} the {device}.",
        ],

        (Category::Contacts, S::Message) => &[
            "Sending a message to {name}.",
            "Your message to {name} is on its way.",
        ],
        (Category::Contacts, S::FindContact) => &[
            "Looking up {name} in your contacts.",
            "Here's what I have for {name}.",
        ],
        (Category::Contacts, _) => &[
            "Calling {name}.",
            "Calling {name} now.",
            "Dialing {name} for you.",
        ],

        (Category::Navigation, S::FindNearby) => &[
            "Looking for {place} nearby.",
            "Here are some {place} close to you.",
        ],
        (Category::Navigation, S::Directions) => &[
            "Getting directions to {destination}.",
            "Here's the best route to {destination}.",
        ],
        (Category::Navigation, _) => &[
            "Checking your current location.",
            "Let me find out where you are.",
        ],

        (Category::InformationQuery, _) => &[
            "Let me find information about {topic} for you.",
            "Searching for {topic} now.",
            "I'll look up {topic} and get back to you.",
        ],
        (Category::SystemControl, _) => &[
            "Sure, let me take care of that.",
            "I can handle music, lights, your calendar, home devices, calls and directions. What would you like to do?",
        ],
        (Category::Greeting, _) => &[
            "Hello! How can I help you today?",
            "Hi there! What can I do for you?",
            "Good to see you! How can I assist?",
            "Hey! What would you like me to help with?",
        ],
        (Category::Goodbye, _) => &[
            "Goodbye! Have a great day!",
            "See you later! Let me know if you need anything.",
            "Take care! I'm here whenever you need me.",
        ],
        (Category::Question, _) => &[
            "Good question. Let me think about {topic}.",
            "Let me look into {topic} for you.",
            "Here's what I know about {topic}.",
        ],
        (Category::TaskRequest, _) => &[
            "I'll do my best to help with {request}.",
            "On it. Let me work on {request}.",
            "Let me take care of that for you.",
        ],
        (Category::Creative, _) => &[
            "Let's get creative with {topic}!",
            "I love that idea. Let's brainstorm {topic} together.",
        ],
        (Category::Technical, _) => &[
            "Let's work through {topic} step by step.",
            "Let me take a technical look at {topic}.",
        ],
        (Category::Personal, _) => &[
            "Thank you for sharing that with me. I'm here for you.",
            "That sounds important. Tell me more about it.",
        ],
        (Category::Cooking, _) => &[
            "Let's get cooking! Here's an idea for {food}.",
            "Good choice. Let me find something tasty with {food}.",
        ],
        (Category::Learning, _) => &[
            "Happy to help you learn about {topic}.",
            "Let's explore {topic} together.",
        ],
        (Category::Emotional, _) => &[
            "I hear you. How are you feeling about it now?",
            "Thank you for telling me how you feel. I'm here to listen.",
        ],
        (Category::Planning, _) => &[
            "Let's put together a plan for {topic}.",
            "Good idea to plan ahead. Let's start with {topic}.",
        ],
        (Category::Analysis, _) => &[
            "Let me analyze {topic} for you.",
            "I'll break {topic} down and compare the key points.",
        ],
        (Category::Casual, _) => &[
            "I understand you're asking about {topic}. Let me help with that.",
            "I'll do my best to help with {request}.",
            "Let me process that request for you.",
        ],
    }
}

const CLARIFYING: &[&str] = &[
    "I'm not completely sure what you mean. Could you tell me a bit more?",
    "Could you rephrase that? I want to make sure I get it right.",
];

const REFLECTIONS: &[&str] = &[
    "I'm enjoying our conversation.",
    "I like learning how you think about things.",
    "Every chat helps me understand you a little better.",
];

const FOLLOW_UPS: &[&str] = &[
    "Is there anything else I can help with?",
    "What else is on your mind?",
    "Would you like to go deeper on that?",
];

// ── Placeholders ────────────────────────────────────────────────────────

/// Values available to a template.
struct Fills<'a> {
    entities: &'a Entities,
    sub: SubIntent,
}

impl Fills<'_> {
    fn default_device(&self) -> &'static str {
        match self.sub {
            SubIntent::Lock | SubIntent::Unlock => "front door",
            SubIntent::DeviceOn | SubIntent::DeviceOff | SubIntent::DeviceStatus => "device",
            _ => "lights",
        }
    }

    fn entity_or(&self, kind: EntityKind, default: &'static str) -> Cow<'_, str> {
        self.entities
            .first(kind)
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(default))
    }

    fn first_of(&self, kinds: &[EntityKind], default: &'static str) -> Cow<'_, str> {
        kinds
            .iter()
            .find_map(|kind| self.entities.first(*kind))
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(default))
    }

    fn value(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "music" => self.entity_or(EntityKind::Primary, "your music"),
            "device" => self.entity_or(EntityKind::Device, self.default_device()),
            "room" => self.entity_or(EntityKind::Room, "living room"),
            "level" => self.entity_or(EntityKind::Number, "50"),
            "color" => self.entity_or(EntityKind::Color, "white"),
            "time" => self
                .entities
                .first(EntityKind::Time)
                .or_else(|| self.entities.first(EntityKind::Date))
                .map(Cow::Borrowed)
                .unwrap_or(Cow::Borrowed("the scheduled time")),
            "event" => self.entity_or(EntityKind::Primary, "your event"),
            "topic" => self.entity_or(EntityKind::Primary, "that"),
            "request" => self.entity_or(EntityKind::Primary, "your request"),
            "name" => self.first_of(&[EntityKind::Names, EntityKind::Primary], "your contact"),
            "destination" => {
                self.first_of(&[EntityKind::Locations, EntityKind::Primary], "your destination")
            }
            "place" => self.entity_or(EntityKind::Primary, "places"),
            "food" => self.entity_or(EntityKind::FoodItems, "your meal"),
            "count" => self.entity_or(EntityKind::Number, "no"),
            "temperature" => match self.entities.first(EntityKind::Number) {
                Some(n) => Cow::Owned(format!("{n} degrees")),
                None => Cow::Borrowed("your usual temperature"),
            },
            "action" => Cow::Borrowed(match self.sub {
                SubIntent::DeviceOn => "turned on",
                SubIntent::DeviceOff => "turned off",
                _ => "updated",
            }),
            _ => return None,
        };
        Some(value)
    }
}

/// Replace every `{name}` in `template`. Unknown names become empty;
/// braces in inserted values are dropped so nothing is substituted twice.
fn fill(template: &str, fills: &Fills<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder_name(&after[..close]) => {
                let name = &after[..close];
                match fills.value(name) {
                    Some(v) => out.push_str(&v.replace(['{', '}'], "")),
                    None => warn!(placeholder = name, "unknown template placeholder"),
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

// ── Responder ───────────────────────────────────────────────────────────

/// Renders replies from the template tables.
#[derive(Clone)]
pub struct TemplateResponder {
    random: Arc<dyn RandomSource>,
    style: ResponseStyle,
}

impl TemplateResponder {
    pub fn new(random: Arc<dyn RandomSource>, style: ResponseStyle) -> Self {
        Self { random, style }
    }

    /// Render the template family for `category` / `intent`.
    ///
    /// The context snapshot is accepted for symmetry with the planner;
    /// templates are chosen from the utterance alone.
    pub fn render(
        &self,
        category: Category,
        intent: Intent,
        entities: &Entities,
        _context: &ContextSnapshot,
    ) -> String {
        let sub = subintent::resolve(category, intent, entities);
        let family = templates(category, sub);
        let template = self.choose(family);
        fill(template, &Fills { entities, sub })
    }

    /// Render the reply for a full classification, honoring the
    /// strategy's clarifying override and the configured style.
    pub fn respond(&self, classification: &Classification, context: &ContextSnapshot) -> String {
        let strategy = &classification.response_strategy;
        let mut text = if strategy.approach == Approach::Clarifying {
            self.choose(CLARIFYING).to_string()
        } else {
            self.render(
                classification.category,
                classification.intent,
                &classification.entities,
                context,
            )
        };

        if self.style == ResponseStyle::Companion && !classification.category.is_system_command() {
            text.push(' ');
            text.push_str(self.choose(REFLECTIONS));
            if strategy.include_followup && strategy.approach != Approach::Clarifying {
                text.push(' ');
                text.push_str(self.choose(FOLLOW_UPS));
            }
        }
        text
    }

    fn choose(&self, family: &'static [&'static str]) -> &'static str {
        if family.is_empty() {
            return "";
        }
        let i = self.random.pick(family.len()).min(family.len() - 1);
        family[i]
    }
}

impl Default for TemplateResponder {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom), ResponseStyle::Concise)
    }
}

impl std::fmt::Debug for TemplateResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateResponder")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// Every template string, for coverage checks.
pub fn all_templates() -> Vec<&'static str> {
    use SubIntent as S;
    const SUBS: [SubIntent; 27] = [
        S::Play,
        S::Pause,
        S::Volume,
        S::NextTrack,
        S::PreviousTrack,
        S::LightOn,
        S::LightOff,
        S::Brightness,
        S::Color,
        S::ScheduleEvent,
        S::CancelEvent,
        S::QueryCalendar,
        S::Temperature,
        S::Unlock,
        S::Lock,
        S::Disarm,
        S::Arm,
        S::DeviceStatus,
        S::DeviceOff,
        S::DeviceOn,
        S::Call,
        S::Message,
        S::FindContact,
        S::Directions,
        S::Locate,
        S::FindNearby,
        S::General,
    ];
    let mut all: Vec<&'static str> = Category::ALL
        .iter()
        .flat_map(|c| SUBS.iter().flat_map(move |s| templates(*c, *s).iter().copied()))
        .chain(CLARIFYING.iter().copied())
        .chain(REFLECTIONS.iter().copied())
        .chain(FOLLOW_UPS.iter().copied())
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}
