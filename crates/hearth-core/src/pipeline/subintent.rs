//! Sub-intent resolution for system-command categories.
//!
//! The responder picks a template family and the planner picks a command
//! from the same [`SubIntent`], so a reply never describes a different
//! operation than the one dispatched. Resolution walks a small ordered
//! rule list per category; the first predicate that holds wins.

use hearth_types::classification::{Category, Entities, EntityKind, Intent};

/// Fine-grained operation inside a system-command category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubIntent {
    Play,
    Pause,
    Volume,
    NextTrack,
    PreviousTrack,
    LightOn,
    LightOff,
    Brightness,
    Color,
    ScheduleEvent,
    CancelEvent,
    QueryCalendar,
    Temperature,
    Unlock,
    Lock,
    Disarm,
    Arm,
    DeviceStatus,
    DeviceOff,
    DeviceOn,
    Call,
    Message,
    FindContact,
    Directions,
    Locate,
    FindNearby,
    /// Categories without sub-intents.
    General,
}

type Predicate = fn(Intent, &Entities) -> bool;

struct Rule {
    when: Predicate,
    then: SubIntent,
}

fn always(_: Intent, _: &Entities) -> bool {
    true
}

fn captured(entities: &Entities, word: &str) -> bool {
    entities.primary() == Some(word) || entities.secondary() == Some(word)
}

// ── Music ───────────────────────────────────────────────────────────────

fn music_pause(i: Intent, _: &Entities) -> bool {
    i == Intent::Pause
}
fn music_volume(i: Intent, e: &Entities) -> bool {
    i == Intent::Volume || captured(e, "volume")
}
fn music_next(i: Intent, _: &Entities) -> bool {
    i == Intent::NextTrack
}
fn music_previous(i: Intent, _: &Entities) -> bool {
    i == Intent::PreviousTrack
}

const MUSIC_RULES: &[Rule] = &[
    Rule { when: music_pause, then: SubIntent::Pause },
    Rule { when: music_volume, then: SubIntent::Volume },
    Rule { when: music_next, then: SubIntent::NextTrack },
    Rule { when: music_previous, then: SubIntent::PreviousTrack },
    Rule { when: always, then: SubIntent::Play },
];

// ── Lighting ────────────────────────────────────────────────────────────

fn light_off(i: Intent, e: &Entities) -> bool {
    i == Intent::TurnOff || captured(e, "off")
}
fn light_brightness(i: Intent, e: &Entities) -> bool {
    i == Intent::AdjustBrightness || e.contains(EntityKind::Number)
}
fn light_color(i: Intent, e: &Entities) -> bool {
    i == Intent::SetColor || e.contains(EntityKind::Color)
}

const LIGHTING_RULES: &[Rule] = &[
    Rule { when: light_off, then: SubIntent::LightOff },
    Rule { when: light_brightness, then: SubIntent::Brightness },
    Rule { when: light_color, then: SubIntent::Color },
    Rule { when: always, then: SubIntent::LightOn },
];

// ── Calendar ────────────────────────────────────────────────────────────

fn calendar_cancel(i: Intent, _: &Entities) -> bool {
    i == Intent::Cancel
}
fn calendar_schedule(i: Intent, _: &Entities) -> bool {
    i == Intent::Schedule
}

const CALENDAR_RULES: &[Rule] = &[
    Rule { when: calendar_cancel, then: SubIntent::CancelEvent },
    Rule { when: calendar_schedule, then: SubIntent::ScheduleEvent },
    Rule { when: always, then: SubIntent::QueryCalendar },
];

// ── Home automation ─────────────────────────────────────────────────────

fn home_temperature(i: Intent, e: &Entities) -> bool {
    i == Intent::SetTemperature || e.contains(EntityKind::Number)
}
fn home_unlock(i: Intent, _: &Entities) -> bool {
    i == Intent::Unlock
}
fn home_lock(i: Intent, _: &Entities) -> bool {
    i == Intent::Lock
}
fn home_disarm(i: Intent, _: &Entities) -> bool {
    i == Intent::DisarmSecurity
}
fn home_arm(i: Intent, _: &Entities) -> bool {
    i == Intent::ArmSecurity
}
fn home_status(i: Intent, _: &Entities) -> bool {
    i == Intent::CheckStatus
}
fn home_off(i: Intent, e: &Entities) -> bool {
    i == Intent::TurnOff || captured(e, "off")
}

const HOME_RULES: &[Rule] = &[
    Rule { when: home_temperature, then: SubIntent::Temperature },
    Rule { when: home_unlock, then: SubIntent::Unlock },
    Rule { when: home_lock, then: SubIntent::Lock },
    Rule { when: home_disarm, then: SubIntent::Disarm },
    Rule { when: home_arm, then: SubIntent::Arm },
    Rule { when: home_status, then: SubIntent::DeviceStatus },
    Rule { when: home_off, then: SubIntent::DeviceOff },
    Rule { when: always, then: SubIntent::DeviceOn },
];

// ── Contacts ────────────────────────────────────────────────────────────

fn contact_message(i: Intent, _: &Entities) -> bool {
    i == Intent::Message
}
fn contact_find(i: Intent, _: &Entities) -> bool {
    i == Intent::FindContact
}

const CONTACT_RULES: &[Rule] = &[
    Rule { when: contact_message, then: SubIntent::Message },
    Rule { when: contact_find, then: SubIntent::FindContact },
    Rule { when: always, then: SubIntent::Call },
];

// ── Navigation ──────────────────────────────────────────────────────────

fn nav_nearby(i: Intent, _: &Entities) -> bool {
    i == Intent::FindNearby
}
fn nav_directions(i: Intent, e: &Entities) -> bool {
    i == Intent::Directions || e.contains(EntityKind::Locations)
}

const NAVIGATION_RULES: &[Rule] = &[
    Rule { when: nav_nearby, then: SubIntent::FindNearby },
    Rule { when: nav_directions, then: SubIntent::Directions },
    Rule { when: always, then: SubIntent::Locate },
];

fn rules_for(category: Category) -> &'static [Rule] {
    match category {
        Category::MusicControl => MUSIC_RULES,
        Category::LightingControl => LIGHTING_RULES,
        Category::CalendarManagement => CALENDAR_RULES,
        Category::HomeAutomation => HOME_RULES,
        Category::Contacts => CONTACT_RULES,
        Category::Navigation => NAVIGATION_RULES,
        _ => &[],
    }
}

/// Resolve the sub-intent for a category, intent and entity set.
pub fn resolve(category: Category, intent: Intent, entities: &Entities) -> SubIntent {
    rules_for(category)
        .iter()
        .find(|rule| (rule.when)(intent, entities))
        .map(|rule| rule.then)
        .unwrap_or(SubIntent::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(kind: EntityKind, value: &str) -> Entities {
        let mut e = Entities::new();
        e.push(kind, value);
        e
    }

    #[test]
    fn music_defaults_to_play() {
        assert_eq!(
            resolve(Category::MusicControl, Intent::Unknown, &Entities::new()),
            SubIntent::Play
        );
        assert_eq!(
            resolve(Category::MusicControl, Intent::Pause, &Entities::new()),
            SubIntent::Pause
        );
    }

    #[test]
    fn volume_from_capture() {
        let e = with(EntityKind::Primary, "volume");
        assert_eq!(resolve(Category::MusicControl, Intent::Unknown, &e), SubIntent::Volume);
    }

    #[test]
    fn lighting_off_beats_number() {
        let mut e = with(EntityKind::Number, "40");
        e.push(EntityKind::Primary, "off");
        assert_eq!(resolve(Category::LightingControl, Intent::Unknown, &e), SubIntent::LightOff);
    }

    #[test]
    fn lighting_number_means_brightness() {
        let e = with(EntityKind::Number, "40");
        assert_eq!(
            resolve(Category::LightingControl, Intent::TurnOn, &e),
            SubIntent::Brightness
        );
    }

    #[test]
    fn lighting_color_entity() {
        let e = with(EntityKind::Color, "blue");
        assert_eq!(resolve(Category::LightingControl, Intent::TurnOn, &e), SubIntent::Color);
    }

    #[test]
    fn home_rules_in_order() {
        let none = Entities::new();
        assert_eq!(resolve(Category::HomeAutomation, Intent::Unlock, &none), SubIntent::Unlock);
        assert_eq!(resolve(Category::HomeAutomation, Intent::TurnOff, &none), SubIntent::DeviceOff);
        assert_eq!(resolve(Category::HomeAutomation, Intent::Unknown, &none), SubIntent::DeviceOn);
        let number = with(EntityKind::Number, "21");
        assert_eq!(
            resolve(Category::HomeAutomation, Intent::Unknown, &number),
            SubIntent::Temperature
        );
    }

    #[test]
    fn contacts_default_to_call() {
        let none = Entities::new();
        assert_eq!(resolve(Category::Contacts, Intent::Unknown, &none), SubIntent::Call);
        assert_eq!(resolve(Category::Contacts, Intent::Message, &none), SubIntent::Message);
        assert_eq!(
            resolve(Category::Contacts, Intent::FindContact, &none),
            SubIntent::FindContact
        );
    }

    #[test]
    fn navigation_location_means_directions() {
        let none = Entities::new();
        assert_eq!(resolve(Category::Navigation, Intent::Unknown, &none), SubIntent::Locate);
        let place = with(EntityKind::Locations, "Boston");
        assert_eq!(
            resolve(Category::Navigation, Intent::Unknown, &place),
            SubIntent::Directions
        );
        assert_eq!(
            resolve(Category::Navigation, Intent::FindNearby, &place),
            SubIntent::FindNearby
        );
    }

    #[test]
    fn conversational_categories_are_general() {
        assert_eq!(
            resolve(Category::Greeting, Intent::Hello, &Entities::new()),
            SubIntent::General
        );
    }
}
