//! Action planner.
//!
//! Maps a classification to zero or more [`ActionDescriptor`]s for the
//! system router. Only system-command categories and lookups produce
//! actions; everything else plans nothing. The command is picked from the
//! same [`SubIntent`] the responder uses.

use hearth_types::action::ActionDescriptor;
use hearth_types::classification::{Category, Classification, Entities, EntityKind};
use hearth_types::context::ContextSnapshot;
use serde_json::Value;
use tracing::debug;

use super::subintent::{self, SubIntent};

/// Target system names understood by the router.
pub mod systems {
    pub const SPOTIFY: &str = "spotify";
    pub const PHILIPS_HUE: &str = "philips_hue";
    pub const GOOGLE_CALENDAR: &str = "google_calendar";
    pub const HOME_ASSISTANT: &str = "home_assistant";
    pub const SEARCH: &str = "search";
    pub const CONTACTS: &str = "contacts";
    pub const LOCATION_SERVICES: &str = "location_services";
}

const DEFAULT_LEVEL: i64 = 50;
const DEFAULT_TEMPERATURE: i64 = 72;

/// Stateless planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionPlanner;

impl ActionPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan the actions for `classification`.
    ///
    /// Parameters come from extracted entities with literal defaults; the
    /// context snapshot is not consulted.
    pub fn plan(
        &self,
        classification: &Classification,
        _context: &ContextSnapshot,
    ) -> Vec<ActionDescriptor> {
        let entities = &classification.entities;
        let sub = subintent::resolve(classification.category, classification.intent, entities);

        let action = match classification.category {
            Category::MusicControl => Some(music(sub, entities)),
            Category::LightingControl => Some(lighting(sub, entities)),
            Category::CalendarManagement => Some(calendar(sub, entities)),
            Category::HomeAutomation => Some(home(sub, entities)),
            Category::Contacts => Some(contacts(sub, entities)),
            Category::Navigation => Some(navigation(sub, entities)),
            Category::InformationQuery => Some(
                ActionDescriptor::new(systems::SEARCH, "web_search")
                    .with_param("query", text_or(entities.primary(), "information")),
            ),
            _ => None,
        };

        if let Some(a) = &action {
            debug!(system = %a.system, command = %a.command, "planned action");
        }
        action.into_iter().collect()
    }
}

fn text_or(value: Option<&str>, default: &str) -> Value {
    Value::from(value.unwrap_or(default))
}

fn number_or(entities: &Entities, default: i64) -> Value {
    Value::from(entities.first_number(EntityKind::Number).unwrap_or(default))
}

/// The device named by the utterance: a device entity, then the target
/// capture with a leading article dropped.
fn device_name<'a>(entities: &'a Entities, fallback: Option<&'a str>) -> Option<&'a str> {
    entities
        .first(EntityKind::Device)
        .or(fallback)
        .map(|d| d.strip_prefix("the ").unwrap_or(d))
        .filter(|d| !d.is_empty())
}

/// The door named by a lock command: the target capture, then any device.
fn door_name(entities: &Entities) -> Option<&str> {
    entities
        .secondary()
        .or_else(|| entities.first(EntityKind::Device))
}

fn music(sub: SubIntent, e: &Entities) -> ActionDescriptor {
    let system = systems::SPOTIFY;
    match sub {
        SubIntent::Pause => ActionDescriptor::new(system, "pause"),
        SubIntent::Volume => {
            ActionDescriptor::new(system, "set_volume").with_param("volume", number_or(e, DEFAULT_LEVEL))
        }
        SubIntent::NextTrack => ActionDescriptor::new(system, "next_track"),
        SubIntent::PreviousTrack => ActionDescriptor::new(system, "previous_track"),
        _ => ActionDescriptor::new(system, "search_and_play")
            .with_param("query", text_or(e.primary(), "music")),
    }
}

fn lighting(sub: SubIntent, e: &Entities) -> ActionDescriptor {
    let command = match sub {
        SubIntent::LightOff => "turn_off_light",
        SubIntent::Brightness => "set_brightness",
        SubIntent::Color => "set_color",
        _ => "turn_on_light",
    };
    let action = ActionDescriptor::new(systems::PHILIPS_HUE, command)
        .with_param("device", text_or(e.first(EntityKind::Device), "lights"))
        .with_param("room", text_or(e.first(EntityKind::Room), "living room"));
    match sub {
        SubIntent::Brightness => action.with_param("brightness", number_or(e, DEFAULT_LEVEL)),
        SubIntent::Color => action.with_param("color", text_or(e.first(EntityKind::Color), "white")),
        _ => action,
    }
}

fn calendar(sub: SubIntent, e: &Entities) -> ActionDescriptor {
    let system = systems::GOOGLE_CALENDAR;
    match sub {
        SubIntent::CancelEvent => ActionDescriptor::new(system, "cancel_event")
            .with_param("title", text_or(e.primary(), "meeting")),
        SubIntent::ScheduleEvent => {
            let time = e.first(EntityKind::Time).or_else(|| e.first(EntityKind::Date));
            ActionDescriptor::new(system, "create_event")
                .with_param("title", text_or(e.primary(), "Meeting"))
                .with_param("time", text_or(time, "tomorrow"))
        }
        _ => ActionDescriptor::new(system, "get_upcoming_events").with_param("days_ahead", Value::from(1)),
    }
}

fn home(sub: SubIntent, e: &Entities) -> ActionDescriptor {
    let system = systems::HOME_ASSISTANT;
    match sub {
        SubIntent::Temperature => ActionDescriptor::new(system, "set_temperature")
            .with_param("temperature", number_or(e, DEFAULT_TEMPERATURE)),
        SubIntent::Unlock => ActionDescriptor::new(system, "unlock_door")
            .with_param("door", text_or(door_name(e), "front door")),
        SubIntent::Lock => ActionDescriptor::new(system, "lock_door")
            .with_param("door", text_or(door_name(e), "front door")),
        SubIntent::Disarm => ActionDescriptor::new(system, "disarm_security"),
        SubIntent::Arm => ActionDescriptor::new(system, "arm_security"),
        SubIntent::DeviceStatus => ActionDescriptor::new(system, "get_state")
            .with_param("device", text_or(device_name(e, e.primary()), "device")),
        SubIntent::DeviceOff => ActionDescriptor::new(system, "turn_off")
            .with_param("device", text_or(device_name(e, e.secondary()), "device")),
        _ => ActionDescriptor::new(system, "turn_on")
            .with_param("device", text_or(device_name(e, e.secondary()), "device")),
    }
}

/// The person an utterance refers to: a capitalized name, then the
/// target capture.
fn person(entities: &Entities) -> Option<&str> {
    entities
        .first(EntityKind::Names)
        .or_else(|| entities.primary())
}

/// The place an utterance refers to: a location entity, then the target
/// capture.
fn place(entities: &Entities) -> Option<&str> {
    entities
        .first(EntityKind::Locations)
        .or_else(|| entities.primary())
}

fn contacts(sub: SubIntent, e: &Entities) -> ActionDescriptor {
    let system = systems::CONTACTS;
    let name = text_or(person(e), "contact");
    match sub {
        SubIntent::Message => {
            let action = ActionDescriptor::new(system, "send_message").with_param("name", name);
            match e.secondary() {
                Some(body) => action.with_param("message", Value::from(body)),
                None => action,
            }
        }
        SubIntent::FindContact => ActionDescriptor::new(system, "search_contact").with_param("name", name),
        _ => ActionDescriptor::new(system, "call").with_param("name", name),
    }
}

fn navigation(sub: SubIntent, e: &Entities) -> ActionDescriptor {
    let system = systems::LOCATION_SERVICES;
    match sub {
        SubIntent::Directions => ActionDescriptor::new(system, "get_directions")
            .with_param("destination", text_or(place(e), "home")),
        SubIntent::FindNearby => ActionDescriptor::new(system, "find_nearby")
            .with_param("query", text_or(e.primary(), "places")),
        _ => ActionDescriptor::new(system, "get_location"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifier::PatternClassifier;
    use crate::pipeline::traits::UtteranceClassifier;

    fn plan(text: &str) -> Vec<ActionDescriptor> {
        let c = PatternClassifier::default().classify(text, None);
        ActionPlanner::new().plan(&c, &ContextSnapshot::default())
    }

    #[test]
    fn play_some_jazz() {
        let actions = plan("play some jazz");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].system, "spotify");
        assert_eq!(actions[0].command, "search_and_play");
        assert_eq!(actions[0].param_str("query"), Some("some jazz"));
    }

    #[test]
    fn kitchen_light_off() {
        let actions = plan("turn off the kitchen light");
        assert_eq!(actions.len(), 1);
        let a = &actions[0];
        assert_eq!(a.system, "philips_hue");
        assert_eq!(a.command, "turn_off_light");
        assert_eq!(a.param_str("device"), Some("light"));
        assert_eq!(a.param_str("room"), Some("kitchen"));
    }

    #[test]
    fn brightness_with_number() {
        let actions = plan("set the bedroom lights to 40%");
        let a = &actions[0];
        assert_eq!(a.command, "set_brightness");
        assert_eq!(a.param_i64("brightness"), Some(40));
        assert_eq!(a.param_str("room"), Some("bedroom"));
    }

    #[test]
    fn dim_without_number_defaults_to_fifty() {
        let actions = plan("dim the lamp");
        assert_eq!(actions[0].command, "set_brightness");
        assert_eq!(actions[0].param_i64("brightness"), Some(50));
    }

    #[test]
    fn schedule_meeting() {
        let actions = plan("schedule a team sync for tomorrow at 3pm");
        let a = &actions[0];
        assert_eq!(a.system, "google_calendar");
        assert_eq!(a.command, "create_event");
        assert_eq!(a.param_str("title"), Some("a team sync"));
        assert_eq!(a.param_str("time"), Some("tomorrow"));
    }

    #[test]
    fn calendar_query() {
        let actions = plan("what's on my calendar");
        assert_eq!(actions[0].command, "get_upcoming_events");
        assert_eq!(actions[0].param_i64("days_ahead"), Some(1));
    }

    #[test]
    fn thermostat() {
        let actions = plan("set the temperature to 68");
        let a = &actions[0];
        assert_eq!(a.system, "home_assistant");
        assert_eq!(a.command, "set_temperature");
        assert_eq!(a.param_i64("temperature"), Some(68));
    }

    #[test]
    fn home_device_off_uses_device_entity() {
        let actions = plan("turn off the tv");
        let a = &actions[0];
        assert_eq!(a.command, "turn_off");
        assert_eq!(a.param_str("device"), Some("tv"));
    }

    #[test]
    fn home_device_on_uses_target_capture() {
        let actions = plan("turn on the fan");
        let a = &actions[0];
        assert_eq!(a.command, "turn_on");
        assert_eq!(a.param_str("device"), Some("fan"));
    }

    #[test]
    fn lock_door() {
        let actions = plan("lock the front door");
        assert_eq!(actions[0].command, "lock_door");
        assert_eq!(actions[0].param_str("door"), Some("front door"));
    }

    #[test]
    fn music_controls() {
        assert_eq!(plan("pause the music")[0].command, "pause");
        assert_eq!(plan("skip this song")[0].command, "next_track");
        let volume = plan("volume 30");
        assert_eq!(volume[0].command, "set_volume");
        assert_eq!(volume[0].param_i64("volume"), Some(30));
    }

    #[test]
    fn lookup_becomes_search() {
        let actions = plan("tell me about black holes");
        assert_eq!(actions[0].system, "search");
        assert_eq!(actions[0].param_str("query"), Some("black holes"));
    }

    #[test]
    fn call_maria() {
        let actions = plan("call Maria");
        assert_eq!(actions.len(), 1);
        let a = &actions[0];
        assert_eq!(a.system, "contacts");
        assert_eq!(a.command, "call");
        assert_eq!(a.param_str("name"), Some("Maria"));
        assert_eq!(a.parameters.len(), 1);
    }

    #[test]
    fn contact_commands_use_capture_without_a_name() {
        assert_eq!(plan("call mom")[0].param_str("name"), Some("mom"));

        let message = plan("text Maria that I am running late");
        assert_eq!(message[0].command, "send_message");
        assert_eq!(message[0].param_str("name"), Some("Maria"));
        assert_eq!(message[0].param_str("message"), Some("i am running late"));

        let lookup = plan("find the phone number for Maria");
        assert_eq!(lookup[0].command, "search_contact");
        assert_eq!(lookup[0].param_str("name"), Some("Maria"));
    }

    #[test]
    fn directions_use_location_entity() {
        let actions = plan("get directions to Boston");
        let a = &actions[0];
        assert_eq!(a.system, "location_services");
        assert_eq!(a.command, "get_directions");
        assert_eq!(a.param_str("destination"), Some("Boston"));
    }

    #[test]
    fn location_and_nearby() {
        assert_eq!(plan("what's my current location")[0].command, "get_location");
        let nearby = plan("find coffee shops nearby");
        assert_eq!(nearby[0].command, "find_nearby");
        assert_eq!(nearby[0].param_str("query"), Some("coffee shops"));
    }

    #[test]
    fn conversation_plans_nothing() {
        assert!(plan("hello there").is_empty());
        assert!(plan("").is_empty());
        assert!(plan("I feel so sad today").is_empty());
    }
}
