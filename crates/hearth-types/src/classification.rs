//! Classification types.
//!
//! A [`Classification`] is what the classifier stage produces for a single
//! utterance: the winning [`Category`], the finer-grained [`Intent`], a
//! confidence in `0.0..=1.0`, the extracted [`Entities`], three derived
//! signals (tone, urgency, complexity), the tools the request may need and
//! the [`Strategy`] the responder should follow.
//!
//! All label enums serialize as `snake_case` strings so the record can be
//! stored alongside messages by persistence collaborators and read back
//! without loss.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Category ────────────────────────────────────────────────────────────

/// Top-level classification bucket.
///
/// The variant order is the declaration order used for deterministic
/// tie-breaking: when two categories reach the same normalized score the
/// one listed first wins. [`Category::Casual`] is the mandatory fallback
/// and carries no patterns of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Music playback (play, pause, volume, skip).
    MusicControl,
    /// Smart lighting (on/off, brightness, color).
    LightingControl,
    /// Calendar queries and scheduling.
    CalendarManagement,
    /// Thermostat, locks, security and generic devices.
    HomeAutomation,
    /// Look something up.
    InformationQuery,
    /// Assistant settings, help, status.
    SystemControl,
    /// Calling, messaging and finding people.
    Contacts,
    /// Where am I, directions, places nearby.
    Navigation,
    /// Hello and friends.
    Greeting,
    /// Farewells.
    Goodbye,
    /// Open-ended questions.
    Question,
    /// Generic "do something for me" requests.
    TaskRequest,
    /// Writing, brainstorming, design.
    Creative,
    /// Code and technology.
    Technical,
    /// Advice, support, sharing.
    Personal,
    /// Recipes and kitchen help.
    Cooking,
    /// Learning and explanations.
    Learning,
    /// Feelings.
    Emotional,
    /// Plans, agendas, goals.
    Planning,
    /// Analysis and comparison.
    Analysis,
    /// Small talk; the fallback category.
    Casual,
}

impl Category {
    /// Every category, in declaration (tie-break) order.
    pub const ALL: [Category; 21] = [
        Category::MusicControl,
        Category::LightingControl,
        Category::CalendarManagement,
        Category::HomeAutomation,
        Category::InformationQuery,
        Category::SystemControl,
        Category::Contacts,
        Category::Navigation,
        Category::Greeting,
        Category::Goodbye,
        Category::Question,
        Category::TaskRequest,
        Category::Creative,
        Category::Technical,
        Category::Personal,
        Category::Cooking,
        Category::Learning,
        Category::Emotional,
        Category::Planning,
        Category::Analysis,
        Category::Casual,
    ];

    /// The category assigned when nothing scores above the floor.
    pub const FALLBACK: Category = Category::Casual;

    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MusicControl => "music_control",
            Self::LightingControl => "lighting_control",
            Self::CalendarManagement => "calendar_management",
            Self::HomeAutomation => "home_automation",
            Self::InformationQuery => "information_query",
            Self::SystemControl => "system_control",
            Self::Contacts => "contacts",
            Self::Navigation => "navigation",
            Self::Greeting => "greeting",
            Self::Goodbye => "goodbye",
            Self::Question => "question",
            Self::TaskRequest => "task_request",
            Self::Creative => "creative",
            Self::Technical => "technical",
            Self::Personal => "personal",
            Self::Cooking => "cooking",
            Self::Learning => "learning",
            Self::Emotional => "emotional",
            Self::Planning => "planning",
            Self::Analysis => "analysis",
            Self::Casual => "casual",
        }
    }

    /// Position in [`Category::ALL`].
    pub fn declaration_index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(Self::ALL.len())
    }

    /// Whether turns in this category are commands for an external
    /// system (devices, calendar, phone, maps). Lookups are not commands.
    pub fn is_system_command(&self) -> bool {
        matches!(
            self,
            Self::MusicControl
                | Self::LightingControl
                | Self::CalendarManagement
                | Self::HomeAutomation
                | Self::Contacts
                | Self::Navigation
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

// ── Intent ──────────────────────────────────────────────────────────────

/// Finer-grained action within a category.
///
/// Intent labels are shared across categories (`turn_on` is used by both
/// lighting and home automation). [`Intent::Unknown`] is produced when no
/// intent pattern of the chosen category matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Play,
    Pause,
    Volume,
    NextTrack,
    PreviousTrack,
    TurnOn,
    TurnOff,
    AdjustBrightness,
    SetColor,
    Schedule,
    Cancel,
    QueryCalendar,
    SetTemperature,
    Lock,
    Unlock,
    ArmSecurity,
    DisarmSecurity,
    CheckStatus,
    Call,
    Message,
    FindContact,
    Directions,
    Locate,
    FindNearby,
    Lookup,
    Settings,
    Open,
    Close,
    Help,
    Status,
    Hello,
    Goodbye,
    Factual,
    Opinion,
    Explanation,
    Create,
    Search,
    Calculate,
    Organize,
    Write,
    Brainstorm,
    Design,
    Code,
    Debug,
    ExplainTech,
    Advice,
    Support,
    Share,
    Recipe,
    CookingHelp,
    Unknown,
}

impl Intent {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Volume => "volume",
            Self::NextTrack => "next_track",
            Self::PreviousTrack => "previous_track",
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::AdjustBrightness => "adjust_brightness",
            Self::SetColor => "set_color",
            Self::Schedule => "schedule",
            Self::Cancel => "cancel",
            Self::QueryCalendar => "query_calendar",
            Self::SetTemperature => "set_temperature",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::ArmSecurity => "arm_security",
            Self::DisarmSecurity => "disarm_security",
            Self::CheckStatus => "check_status",
            Self::Call => "call",
            Self::Message => "message",
            Self::FindContact => "find_contact",
            Self::Directions => "directions",
            Self::Locate => "locate",
            Self::FindNearby => "find_nearby",
            Self::Lookup => "lookup",
            Self::Settings => "settings",
            Self::Open => "open",
            Self::Close => "close",
            Self::Help => "help",
            Self::Status => "status",
            Self::Hello => "hello",
            Self::Goodbye => "goodbye",
            Self::Factual => "factual",
            Self::Opinion => "opinion",
            Self::Explanation => "explanation",
            Self::Create => "create",
            Self::Search => "search",
            Self::Calculate => "calculate",
            Self::Organize => "organize",
            Self::Write => "write",
            Self::Brainstorm => "brainstorm",
            Self::Design => "design",
            Self::Code => "code",
            Self::Debug => "debug",
            Self::ExplainTech => "explain_tech",
            Self::Advice => "advice",
            Self::Support => "support",
            Self::Share => "share",
            Self::Recipe => "recipe",
            Self::CookingHelp => "cooking_help",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Entities ────────────────────────────────────────────────────────────

/// Type of an extracted entity.
///
/// [`EntityKind::Primary`] and [`EntityKind::Secondary`] are reserved for
/// the first two capture groups of the classifier's winning pattern; they
/// name "the thing acted upon" without committing to an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Time,
    Date,
    Number,
    Color,
    Device,
    Room,
    Names,
    Locations,
    FoodItems,
    Services,
    Technologies,
    TimeReferences,
    Primary,
    Secondary,
}

impl EntityKind {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Date => "date",
            Self::Number => "number",
            Self::Color => "color",
            Self::Device => "device",
            Self::Room => "room",
            Self::Names => "names",
            Self::Locations => "locations",
            Self::FoodItems => "food_items",
            Self::Services => "services",
            Self::Technologies => "technologies",
            Self::TimeReferences => "time_references",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from entity type to the ordered values found for it.
///
/// Kinds with no values are never stored: [`Entities::insert`] and
/// [`Entities::push`] drop empty input, so `get` returning `Some` always
/// means at least one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities(BTreeMap<EntityKind, Vec<String>>);

impl Entities {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the values for `kind`. Empty `values` removes the kind.
    pub fn insert(&mut self, kind: EntityKind, values: Vec<String>) {
        if values.is_empty() {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, values);
        }
    }

    /// Append one value for `kind`. Empty strings are ignored.
    pub fn push(&mut self, kind: EntityKind, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.0.entry(kind).or_default().push(value);
    }

    /// Values for `kind`, in the order they were found.
    pub fn get(&self, kind: EntityKind) -> Option<&[String]> {
        self.0.get(&kind).map(Vec::as_slice)
    }

    /// First value for `kind`.
    pub fn first(&self, kind: EntityKind) -> Option<&str> {
        self.0.get(&kind).and_then(|v| v.first()).map(String::as_str)
    }

    /// Whether any value was recorded for `kind`.
    pub fn contains(&self, kind: EntityKind) -> bool {
        self.0.contains_key(&kind)
    }

    /// Whether any value of `kind` equals `value` exactly.
    pub fn has_value(&self, kind: EntityKind, value: &str) -> bool {
        self.get(kind)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// First value for `kind` parsed as an integer.
    pub fn first_number(&self, kind: EntityKind) -> Option<i64> {
        self.get(kind)?
            .iter()
            .find_map(|v| v.trim_end_matches('%').parse::<i64>().ok())
    }

    /// The `primary` capture, if any.
    pub fn primary(&self) -> Option<&str> {
        self.first(EntityKind::Primary)
    }

    /// The `secondary` capture, if any.
    pub fn secondary(&self) -> Option<&str> {
        self.first(EntityKind::Secondary)
    }

    /// Remove a kind, returning its values.
    pub fn remove(&mut self, kind: EntityKind) -> Option<Vec<String>> {
        self.0.remove(&kind)
    }

    /// Number of kinds present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no kind is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate kinds and their values in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &[String])> {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Append every value of `other`, keeping at most `cap` most recent
    /// values per kind (FIFO eviction).
    pub fn merge_bounded(&mut self, other: &Entities, cap: usize) {
        for (kind, values) in other.iter() {
            let slot = self.0.entry(kind).or_default();
            slot.extend(values.iter().cloned());
            if slot.len() > cap {
                let excess = slot.len() - cap;
                slot.drain(..excess);
            }
            if slot.is_empty() {
                self.0.remove(&kind);
            }
        }
    }
}

impl FromIterator<(EntityKind, Vec<String>)> for Entities {
    fn from_iter<I: IntoIterator<Item = (EntityKind, Vec<String>)>>(iter: I) -> Self {
        let mut entities = Entities::new();
        for (kind, values) in iter {
            entities.insert(kind, values);
        }
        entities
    }
}

// ── Derived signals ─────────────────────────────────────────────────────

/// Overall emotional tone of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalTone {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl EmotionalTone {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionalTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low / medium / high scale shared by urgency and complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Low,
    Medium,
    High,
}

impl Level {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgent the request reads.
pub type Urgency = Level;

/// How complex the request reads.
pub type Complexity = Level;

// ── Tools ───────────────────────────────────────────────────────────────

/// Tool identifiers a classification may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    MusicPlayer,
    SmartHome,
    Calendar,
    Contacts,
    Maps,
    WebSearch,
    Configuration,
    Calculator,
    ContentGenerator,
    TextGenerator,
    ImageGenerator,
    RecipeSearch,
}

impl Tool {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MusicPlayer => "music_player",
            Self::SmartHome => "smart_home",
            Self::Calendar => "calendar",
            Self::Contacts => "contacts",
            Self::Maps => "maps",
            Self::WebSearch => "web_search",
            Self::Configuration => "configuration",
            Self::Calculator => "calculator",
            Self::ContentGenerator => "content_generator",
            Self::TextGenerator => "text_generator",
            Self::ImageGenerator => "image_generator",
            Self::RecipeSearch => "recipe_search",
        }
    }
}

// ── Strategy ────────────────────────────────────────────────────────────

/// Overall approach the reply should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Conversational,
    Empathetic,
    Analytical,
    Inspirational,
    Helpful,
    Instructional,
    Welcoming,
    Informative,
    Executing,
    Clarifying,
}

impl Approach {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversational => "conversational",
            Self::Empathetic => "empathetic",
            Self::Analytical => "analytical",
            Self::Inspirational => "inspirational",
            Self::Helpful => "helpful",
            Self::Instructional => "instructional",
            Self::Welcoming => "welcoming",
            Self::Informative => "informative",
            Self::Executing => "executing",
            Self::Clarifying => "clarifying",
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Friendly,
    Supportive,
    Professional,
    Encouraging,
    Efficient,
    Warm,
}

impl Tone {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Supportive => "supportive",
            Self::Professional => "professional",
            Self::Encouraging => "encouraging",
            Self::Efficient => "efficient",
            Self::Warm => "warm",
        }
    }
}

/// Target length of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    Short,
    Medium,
    Long,
    Detailed,
    Focused,
}

impl ResponseLength {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::Detailed => "detailed",
            Self::Focused => "focused",
        }
    }
}

/// Shape of the reply: approach, tone, length and two switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Overall approach.
    pub approach: Approach,
    /// Voice.
    pub tone: Tone,
    /// Target length.
    pub length: ResponseLength,
    /// Whether to close with a follow-up question.
    pub include_followup: bool,
    /// Whether the reply is backed by tool / system calls.
    pub use_tools: bool,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            approach: Approach::Conversational,
            tone: Tone::Friendly,
            length: ResponseLength::Medium,
            include_followup: true,
            use_tools: false,
        }
    }
}

// ── Classification ──────────────────────────────────────────────────────

/// Classification record for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Winning category. Always one of [`Category::ALL`].
    pub category: Category,

    /// Intent within the category.
    pub intent: Intent,

    /// Confidence in `0.0..=1.0`.
    pub confidence: f32,

    /// Extracted entities, including `primary`/`secondary` captures.
    #[serde(default)]
    pub entities: Entities,

    /// Signed keyword tone.
    #[serde(default)]
    pub emotional_tone: EmotionalTone,

    /// Urgency estimate.
    #[serde(default)]
    pub urgency: Urgency,

    /// Complexity estimate.
    #[serde(default)]
    pub complexity: Complexity,

    /// Tools the request may need.
    #[serde(default)]
    pub required_tools: BTreeSet<Tool>,

    /// How the reply should be shaped.
    #[serde(default)]
    pub response_strategy: Strategy,
}

impl Classification {
    /// The fallback classification ([`Category::FALLBACK`], unknown intent)
    /// with the given confidence and no entities or tools.
    pub fn fallback(confidence: f32) -> Self {
        Self {
            category: Category::FALLBACK,
            intent: Intent::Unknown,
            confidence: confidence.clamp(0.0, 1.0),
            entities: Entities::new(),
            emotional_tone: EmotionalTone::Neutral,
            urgency: Level::Low,
            complexity: Level::Low,
            required_tools: BTreeSet::new(),
            response_strategy: Strategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_matches_all() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.declaration_index(), i);
        }
        assert_eq!(Category::ALL.last(), Some(&Category::FALLBACK));
    }

    #[test]
    fn category_labels_roundtrip_through_from_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert!("bogus".parse::<Category>().is_err());
    }

    #[test]
    fn system_commands_exclude_lookups() {
        assert!(Category::Contacts.is_system_command());
        assert!(Category::Navigation.is_system_command());
        assert!(!Category::InformationQuery.is_system_command());
        assert!(!Category::Greeting.is_system_command());
    }

    #[test]
    fn category_serde_matches_as_str() {
        let json = serde_json::to_string(&Category::LightingControl).unwrap();
        assert_eq!(json, "\"lighting_control\"");
        let json = serde_json::to_string(&Intent::NextTrack).unwrap();
        assert_eq!(json, "\"next_track\"");
    }

    #[test]
    fn entities_drop_empty_values() {
        let mut e = Entities::new();
        e.insert(EntityKind::Room, vec![]);
        e.push(EntityKind::Device, "");
        assert!(e.is_empty());
        assert!(e.get(EntityKind::Room).is_none());
    }

    #[test]
    fn entities_first_and_number() {
        let mut e = Entities::new();
        e.push(EntityKind::Number, "40");
        e.push(EntityKind::Number, "60");
        e.push(EntityKind::Room, "kitchen");
        assert_eq!(e.first(EntityKind::Room), Some("kitchen"));
        assert_eq!(e.first_number(EntityKind::Number), Some(40));
        assert!(e.has_value(EntityKind::Number, "60"));
        assert!(!e.has_value(EntityKind::Number, "6"));
    }

    #[test]
    fn entities_merge_bounded_evicts_oldest() {
        let mut acc = Entities::new();
        for i in 0..4 {
            let mut turn = Entities::new();
            turn.push(EntityKind::Number, i.to_string());
            turn.push(EntityKind::Number, (i + 10).to_string());
            acc.merge_bounded(&turn, 3);
        }
        let kept: Vec<&str> = acc
            .get(EntityKind::Number)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(kept, vec!["12", "3", "13"]);
    }

    #[test]
    fn entities_serialize_as_plain_map() {
        let mut e = Entities::new();
        e.push(EntityKind::Device, "light");
        e.push(EntityKind::Primary, "off");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["device"][0], "light");
        assert_eq!(json["primary"][0], "off");
        let back: Entities = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn classification_json_roundtrip_keeps_every_field() {
        let mut c = Classification::fallback(0.5);
        c.category = Category::MusicControl;
        c.intent = Intent::Play;
        c.entities.push(EntityKind::Primary, "some jazz");
        c.emotional_tone = EmotionalTone::Positive;
        c.urgency = Level::High;
        c.complexity = Level::Medium;
        c.required_tools.insert(Tool::MusicPlayer);
        c.response_strategy.approach = Approach::Executing;

        let json = serde_json::to_string(&c).unwrap();
        let back: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn fallback_is_casual_unknown() {
        let c = Classification::fallback(1.7);
        assert_eq!(c.category, Category::Casual);
        assert_eq!(c.intent, Intent::Unknown);
        assert_eq!(c.confidence, 1.0);
    }
}
