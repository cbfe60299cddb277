//! Pattern library.
//!
//! Static tables mapping each [`Category`] to its match patterns, each
//! category's intents to theirs, and a small set of keyword hints used for
//! auxiliary scoring. The tables are compiled once per process into a
//! [`PatternLibrary`] and shared read-only by every classifier.
//!
//! Conventions:
//! - All patterns are compiled case-insensitively.
//! - Only system-command and lookup patterns expose capture groups; the
//!   first one or two groups become the `primary` / `secondary` entities.
//!   Conversational categories use non-capturing groups throughout.
//! - A pattern that fails to compile is logged and skipped; the remaining
//!   patterns keep working.

use std::collections::HashMap;
use std::sync::OnceLock;

use hearth_types::classification::{Category, Intent};
use regex::{Regex, RegexBuilder};
use tracing::error;

// ── Static tables ───────────────────────────────────────────────────────

/// Match patterns for one category.
struct CategoryPatterns {
    category: Category,
    patterns: &'static [&'static str],
}

/// Category patterns in declaration order. [`Category::Casual`] has none.
const CATEGORY_PATTERNS: &[CategoryPatterns] = &[
    CategoryPatterns {
        category: Category::MusicControl,
        patterns: &[
            r"\bplay\s+(.+)",
            r"\bstart\s+(.+?)\s+music\b",
            r"\bput\s+on\s+(.+)",
            r"\blisten\s+to\s+(.+)",
            r"\b(pause|stop)\s+(?:the\s+)?music\b",
            r"\b(next|skip)\s+(?:the\s+)?(?:song|track)\b",
            r"\b(previous)\s+(?:song|track)\b",
            r"\b(volume)\s+(up|down|\d+)",
            r"\b(?:music|songs?|spotify|playlist)\b",
        ],
    },
    CategoryPatterns {
        category: Category::LightingControl,
        patterns: &[
            r"\bturn\s+(on|off)\s+(.+)\s+lights?\b",
            r"\b(dim|brighten)\s+(.+)",
            r"\bset\s+(.+)\s+to\s+(\d+)\s*%",
            r"\bchange\s+(.+)\s+colou?r\s+to\s+(.+)",
            r"\blights?\s+(on|off)\b",
            r"\bmake\s+it\s+(brighter|darker)\b",
            r"\b(?:lights?|lamps?|hue|brightness)\b",
        ],
    },
    CategoryPatterns {
        category: Category::CalendarManagement,
        patterns: &[
            r"\bschedule\s+(.+)\s+for\s+(.+)",
            r"\bcreate\s+(?:a\s+)?meeting\s*(.*)",
            r"\bwhat'?s\s+on\s+my\s+calendar\b",
            r"\bwhen\s+is\s+my\s+next\s+meeting\b",
            r"\bcancel\s+(.+)\s+meeting\b",
            r"\breschedule\s+(.+)",
            r"\bfree\s+time\s*(.*)",
            r"\b(?:calendar|appointments?|meetings?)\b",
        ],
    },
    CategoryPatterns {
        category: Category::HomeAutomation,
        patterns: &[
            r"\bset\s+(?:the\s+)?(?:temperature|thermostat)\s+to\s+(\d+)",
            r"\bturn\s+(on|off)\s+(.+)",
            r"\bcheck\s+(?:the\s+)?(.+?)\s+status\b",
            r"\b(lock|unlock)\s+(?:the\s+)?(front\s+door|back\s+door|door)\b",
            r"\b(arm|disarm)\s+(?:the\s+)?(?:security|alarm)\b",
            r"\b(?:thermostat|temperature|smart\s+home|home\s+assistant|automation)\b",
        ],
    },
    CategoryPatterns {
        category: Category::InformationQuery,
        patterns: &[
            r"\bwhat\s+is\s+(.+)",
            r"\btell\s+me\s+about\s+(.+)",
            r"\bhow\s+do\s+i\s+(.+)",
            r"\bshow\s+me\s+(.+)",
            r"\bfind\s+(.+)",
            r"\bsearch\s+for\s+(.+)",
            r"\blook\s+up\s+(.+)",
            r"\b(?:weather|news)\b",
        ],
    },
    CategoryPatterns {
        category: Category::SystemControl,
        patterns: &[
            r"\bshow\s+my\s+(.+)",
            r"\bopen\s+(.+)",
            r"\bclose\s+(.+)",
            r"\b(?:settings|preferences|configure|setup)\b",
            r"^\s*(?:help|status)\s*[.!?]*\s*$",
            r"\bwhat\s+can\s+you\s+do\b",
        ],
    },
    CategoryPatterns {
        category: Category::Contacts,
        patterns: &[
            r"\bcall\s+(.+)",
            r"\b(?:text|message)\s+(.+?)(?:\s+(?:that|saying)\s+(.+))?$",
            r"\b(?:find|look\s+up|search\s+for)\s+(?:the\s+)?(?:contact|number|phone\s+number)\s+(?:for|of)\s+(.+)",
        ],
    },
    CategoryPatterns {
        category: Category::Navigation,
        patterns: &[
            r"\b(?:directions|route|navigate|way)\s+to\s+(.+)",
            r"\b(?:find|show\s+me|any)\s+(.+?)\s+(?:nearby|near\s+me|around\s+here)\b",
            r"\b(?:my\s+(?:current\s+)?location|where\s+am\s+i)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Greeting,
        patterns: &[
            r"\b(?:hi|hello|hey|greetings)\b",
            r"\bgood\s+(?:morning|afternoon|evening)\b",
            r"\b(?:how\s+are\s+you|what'?s\s+up|how'?s\s+it\s+going)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Goodbye,
        patterns: &[
            r"\b(?:bye|goodbye|farewell|goodnight|good\s+night)\b",
            r"\b(?:see\s+you(?:\s+later)?|talk\s+to\s+you\s+later|take\s+care)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Question,
        patterns: &[
            r"\b(?:what|who|when|where|why|how|which)\b.*\?",
            r"\b(?:can|could|would|will)\s+you\b.*\?",
            r"\b(?:do|did|have|are)\s+you\b.*\?",
            r"\b(?:is\s+it|are\s+there|does\s+it)\b.*\?",
        ],
    },
    CategoryPatterns {
        category: Category::TaskRequest,
        patterns: &[
            r"\b(?:help\s+me|assist\s+me|can\s+you\s+help)\b",
            r"\b(?:create|make|build|generate|produce)\b",
            r"\b(?:find|search|look\s+for|locate)\b",
            r"\b(?:calculate|compute|solve|figure\s+out)\b",
            r"\b(?:organize|plan|schedule|arrange)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Creative,
        patterns: &[
            r"\b(?:write|compose|draft|create)\b.*\b(?:story|poem|article|essay|script)\b",
            r"\b(?:brainstorm|ideate|think\s+of|come\s+up\s+with)\b",
            r"\b(?:design|sketch|draw|visualize)\b",
            r"\b(?:creative|artistic|imaginative)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Technical,
        patterns: &[
            r"\b(?:code|programming|script|function|algorithm)\b",
            r"\b(?:debug|fix|error|bug|issue)\b",
            r"\b(?:api|database|server|framework|library)\b",
            r"\b(?:python|javascript|rust|html|css|sql)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Personal,
        patterns: &[
            r"\b(?:feel|feeling|emotion|mood|sad|happy|angry|worried|stressed)\b",
            r"\b(?:advice|guidance|help|support|counsel)\b",
            r"\b(?:personal|private|confidential|intimate)\b",
            r"\b(?:relationship|family|friend|love|life)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Cooking,
        patterns: &[
            r"\b(?:recipe|cook|cooking|bake|baking|kitchen)\b",
            r"\b(?:ingredients|food|meal|dish|cuisine)\b",
            r"\b(?:chef|culinary|gastronomy)\b",
            r"\b(?:eat|eating|dinner|lunch|breakfast)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Learning,
        patterns: &[
            r"\b(?:learn|teach|explain|understand|study)\b",
            r"\b(?:lesson|tutorial|guide|instruction)\b",
            r"\b(?:knowledge|information|facts|data)\b",
            r"\b(?:remember|memory|recall|forget)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Emotional,
        patterns: &[
            r"\b(?:love|hate|like|dislike|enjoy|prefer)\b",
            r"\b(?:excited|nervous|anxious|calm|peaceful)\b",
            r"\b(?:frustrated|disappointed|satisfied|proud)\b",
            r"\b(?:lonely|happy|sad|angry|confused)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Planning,
        patterns: &[
            r"\b(?:plan|planning|schedule|organize|arrange)\b",
            r"\b(?:calendar|agenda|timeline|deadline)\b",
            r"\b(?:project|task|goal|objective|target)\b",
            r"\b(?:strategy|approach|method|process)\b",
        ],
    },
    CategoryPatterns {
        category: Category::Analysis,
        patterns: &[
            r"\b(?:analyze|analysis|examine|evaluate|assess)\b",
            r"\b(?:compare|contrast|review|study|investigate)\b",
            r"\b(?:data|statistics|numbers|metrics|trends)\b",
            r"\b(?:report|summary|conclusion|findings)\b",
        ],
    },
];

/// Intent patterns for one category, checked in order (first match wins).
struct IntentPatterns {
    category: Category,
    intents: &'static [(Intent, &'static [&'static str])],
}

/// Categories absent from this table always resolve to [`Intent::Unknown`].
const INTENT_PATTERNS: &[IntentPatterns] = &[
    IntentPatterns {
        category: Category::MusicControl,
        intents: &[
            (Intent::Pause, &[r"\b(?:pause|stop)\b"]),
            (Intent::Volume, &[r"\b(?:volume|louder|quieter)\b"]),
            (Intent::NextTrack, &[r"\b(?:next|skip)\b"]),
            (Intent::PreviousTrack, &[r"\bprevious\b", r"\bgo\s+back\b"]),
            (Intent::Play, &[r"\b(?:play|put\s+on|listen\s+to|start)\b"]),
        ],
    },
    IntentPatterns {
        category: Category::LightingControl,
        intents: &[
            (Intent::TurnOff, &[r"\boff\b"]),
            (
                Intent::AdjustBrightness,
                &[
                    r"\b(?:dim|dimmer|darker|brighten|brighter|brightness)\b",
                    r"\d+\s*%",
                ],
            ),
            (
                Intent::SetColor,
                &[
                    r"\bcolou?r\b",
                    r"\b(?:red|blue|green|yellow|orange|purple|pink|warm|cool)\b",
                ],
            ),
            (Intent::TurnOn, &[r"\bon\b"]),
        ],
    },
    IntentPatterns {
        category: Category::CalendarManagement,
        intents: &[
            (Intent::Cancel, &[r"\bcancel\b"]),
            (
                Intent::Schedule,
                &[r"\b(?:schedule|reschedule|book)\b", r"\bcreate\s+(?:a\s+)?meeting\b"],
            ),
            (
                Intent::QueryCalendar,
                &[
                    r"\bwhat'?s\s+on\b",
                    r"\bwhen\s+is\b",
                    r"\bnext\s+meeting\b",
                    r"\bfree\s+time\b",
                    r"\bcalendar\b",
                ],
            ),
        ],
    },
    IntentPatterns {
        category: Category::HomeAutomation,
        intents: &[
            (Intent::SetTemperature, &[r"\b(?:temperature|thermostat|degrees)\b"]),
            (Intent::Unlock, &[r"\bunlock\b"]),
            (Intent::Lock, &[r"\block\b"]),
            (Intent::DisarmSecurity, &[r"\bdisarm\b"]),
            (Intent::ArmSecurity, &[r"\barm\b"]),
            (Intent::CheckStatus, &[r"\bstatus\b", r"\bcheck\b"]),
            (Intent::TurnOff, &[r"\boff\b"]),
            (Intent::TurnOn, &[r"\bon\b"]),
        ],
    },
    IntentPatterns {
        category: Category::InformationQuery,
        intents: &[(
            Intent::Lookup,
            &[
                r"\b(?:what\s+is|tell\s+me\s+about|how\s+do\s+i|show\s+me|look\s+up)\b",
                r"\b(?:find|search|weather|news)\b",
            ],
        )],
    },
    IntentPatterns {
        category: Category::SystemControl,
        intents: &[
            (Intent::Settings, &[r"\b(?:settings|preferences|configure|setup)\b"]),
            (Intent::Open, &[r"\bopen\b", r"\bshow\s+my\b"]),
            (Intent::Close, &[r"\bclose\b"]),
            (Intent::Help, &[r"\bhelp\b", r"\bwhat\s+can\s+you\s+do\b"]),
            (Intent::Status, &[r"\bstatus\b"]),
        ],
    },
    IntentPatterns {
        category: Category::Contacts,
        intents: &[
            (Intent::Message, &[r"\b(?:text|message)\b"]),
            (Intent::FindContact, &[r"\b(?:contact|number|find|look\s+up)\b"]),
            (Intent::Call, &[r"\b(?:call|phone|ring)\b"]),
        ],
    },
    IntentPatterns {
        category: Category::Navigation,
        intents: &[
            (Intent::FindNearby, &[r"\b(?:nearby|near\s+me|around\s+here)\b"]),
            (Intent::Directions, &[r"\b(?:directions|route|navigate|way\s+to)\b"]),
            (Intent::Locate, &[r"\b(?:location|where\s+am\s+i)\b"]),
        ],
    },
    IntentPatterns {
        category: Category::Greeting,
        intents: &[(
            Intent::Hello,
            &[
                r"\b(?:hi|hello|hey|greetings)\b",
                r"\bgood\s+(?:morning|afternoon|evening)\b",
                r"\b(?:how\s+are\s+you|what'?s\s+up|how'?s\s+it\s+going)\b",
            ],
        )],
    },
    IntentPatterns {
        category: Category::Goodbye,
        intents: &[(
            Intent::Goodbye,
            &[
                r"\b(?:bye|goodbye|farewell|goodnight|good\s+night)\b",
                r"\b(?:see\s+you|talk\s+to\s+you\s+later|take\s+care)\b",
            ],
        )],
    },
    IntentPatterns {
        category: Category::Question,
        intents: &[
            (Intent::Factual, &[r"\b(?:what\s+is|who\s+is|when\s+did|where\s+is)\b"]),
            (
                Intent::Opinion,
                &[r"\b(?:what\s+do\s+you\s+think|your\s+opinion|do\s+you\s+like)\b"],
            ),
            (
                Intent::Explanation,
                &[r"\b(?:how\s+does|why\s+does|explain|tell\s+me\s+about)\b"],
            ),
        ],
    },
    IntentPatterns {
        category: Category::TaskRequest,
        intents: &[
            (Intent::Create, &[r"\b(?:create|make|build|generate)\b"]),
            (Intent::Search, &[r"\b(?:find|search|look\s+for)\b"]),
            (Intent::Calculate, &[r"\b(?:calculate|compute|solve)\b"]),
            (Intent::Organize, &[r"\b(?:organize|plan|schedule)\b"]),
        ],
    },
    IntentPatterns {
        category: Category::Creative,
        intents: &[
            (Intent::Write, &[r"\b(?:write|compose|draft)\b"]),
            (Intent::Brainstorm, &[r"\b(?:brainstorm|ideas|think\s+of|come\s+up\s+with)\b"]),
            (Intent::Design, &[r"\b(?:design|sketch|draw)\b"]),
        ],
    },
    IntentPatterns {
        category: Category::Technical,
        intents: &[
            (Intent::Code, &[r"\b(?:code|program|script|function)\b"]),
            (Intent::Debug, &[r"\b(?:debug|fix|error|bug)\b"]),
            (Intent::ExplainTech, &[r"\b(?:explain|how\s+does|technical)\b"]),
        ],
    },
    IntentPatterns {
        category: Category::Personal,
        intents: &[
            (
                Intent::Advice,
                &[r"\b(?:advice|guidance|what\s+should\s+i|recommend)\b"],
            ),
            (
                Intent::Support,
                &[r"\b(?:support|comfort|encourage|help\s+me\s+feel)\b"],
            ),
            (
                Intent::Share,
                &[r"\b(?:tell\s+you|share\s+with\s+you|want\s+to\s+talk)\b"],
            ),
        ],
    },
    IntentPatterns {
        category: Category::Cooking,
        intents: &[
            (Intent::Recipe, &[r"\b(?:recipe|how\s+to\s+cook|how\s+to\s+make)\b"]),
            (Intent::CookingHelp, &[r"\b(?:cooking\s+help|kitchen|ingredients)\b"]),
        ],
    },
];

/// A single keyword that nudges one category's score.
struct KeywordHint {
    keyword: &'static str,
    weight: f32,
    category: Category,
}

/// Keyword hints matched against whole tokens (punctuation stripped).
///
/// The system-command hints keep device commands ahead of the generic
/// question / task buckets, whose wh-word and verb hints would otherwise
/// outscore a single device pattern.
const KEYWORD_HINTS: &[KeywordHint] = &[
    // Feelings
    KeywordHint { keyword: "feel", weight: 0.8, category: Category::Emotional },
    KeywordHint { keyword: "emotion", weight: 0.9, category: Category::Emotional },
    KeywordHint { keyword: "sad", weight: 0.9, category: Category::Emotional },
    KeywordHint { keyword: "happy", weight: 0.8, category: Category::Emotional },
    KeywordHint { keyword: "angry", weight: 0.9, category: Category::Emotional },
    // Making things
    KeywordHint { keyword: "create", weight: 0.8, category: Category::TaskRequest },
    KeywordHint { keyword: "make", weight: 0.7, category: Category::TaskRequest },
    KeywordHint { keyword: "build", weight: 0.8, category: Category::TaskRequest },
    // Wh-words
    KeywordHint { keyword: "what", weight: 0.6, category: Category::Question },
    KeywordHint { keyword: "how", weight: 0.7, category: Category::Question },
    KeywordHint { keyword: "why", weight: 0.8, category: Category::Question },
    KeywordHint { keyword: "when", weight: 0.6, category: Category::Question },
    KeywordHint { keyword: "where", weight: 0.6, category: Category::Question },
    KeywordHint { keyword: "who", weight: 0.6, category: Category::Question },
    // Music
    KeywordHint { keyword: "music", weight: 0.8, category: Category::MusicControl },
    KeywordHint { keyword: "song", weight: 0.7, category: Category::MusicControl },
    KeywordHint { keyword: "spotify", weight: 0.9, category: Category::MusicControl },
    KeywordHint { keyword: "playlist", weight: 0.7, category: Category::MusicControl },
    // Lighting
    KeywordHint { keyword: "light", weight: 0.6, category: Category::LightingControl },
    KeywordHint { keyword: "lights", weight: 0.8, category: Category::LightingControl },
    KeywordHint { keyword: "lamp", weight: 0.7, category: Category::LightingControl },
    KeywordHint { keyword: "dim", weight: 0.8, category: Category::LightingControl },
    KeywordHint { keyword: "brighter", weight: 0.8, category: Category::LightingControl },
    KeywordHint { keyword: "darker", weight: 0.8, category: Category::LightingControl },
    KeywordHint { keyword: "brightness", weight: 0.8, category: Category::LightingControl },
    // Calendar
    KeywordHint { keyword: "calendar", weight: 0.9, category: Category::CalendarManagement },
    KeywordHint { keyword: "meeting", weight: 0.7, category: Category::CalendarManagement },
    KeywordHint { keyword: "appointment", weight: 0.8, category: Category::CalendarManagement },
    // Home
    KeywordHint { keyword: "thermostat", weight: 0.8, category: Category::HomeAutomation },
    KeywordHint { keyword: "temperature", weight: 0.8, category: Category::HomeAutomation },
    // People
    KeywordHint { keyword: "contact", weight: 0.8, category: Category::Contacts },
    KeywordHint { keyword: "contacts", weight: 0.8, category: Category::Contacts },
    KeywordHint { keyword: "phone", weight: 0.7, category: Category::Contacts },
    // Places
    KeywordHint { keyword: "directions", weight: 0.8, category: Category::Navigation },
    KeywordHint { keyword: "navigate", weight: 0.8, category: Category::Navigation },
    KeywordHint { keyword: "location", weight: 0.7, category: Category::Navigation },
    KeywordHint { keyword: "nearby", weight: 0.7, category: Category::Navigation },
];

// ── Compiled library ────────────────────────────────────────────────────

/// A compiled intent and its patterns.
#[derive(Debug)]
pub struct IntentMatcher {
    /// The intent produced when any pattern matches.
    pub intent: Intent,
    /// Compiled patterns.
    pub patterns: Vec<Regex>,
}

impl IntentMatcher {
    fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Capture groups taken from a category's first capturing match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    pub primary: String,
    pub secondary: Option<String>,
}

/// The compiled pattern tables.
///
/// Index `i` of the per-category vectors belongs to `Category::ALL[i]`.
#[derive(Debug)]
pub struct PatternLibrary {
    categories: Vec<Vec<Regex>>,
    intents: Vec<Vec<IntentMatcher>>,
    hints: HashMap<&'static str, (Category, f32)>,
}

impl PatternLibrary {
    /// The process-wide library, compiled on first use.
    pub fn builtin() -> &'static PatternLibrary {
        static LIBRARY: OnceLock<PatternLibrary> = OnceLock::new();
        LIBRARY.get_or_init(PatternLibrary::compile)
    }

    /// Compile every static table.
    pub fn compile() -> Self {
        let mut categories: Vec<Vec<Regex>> = Category::ALL.iter().map(|_| Vec::new()).collect();
        for entry in CATEGORY_PATTERNS {
            let slot = &mut categories[entry.category.declaration_index()];
            slot.extend(entry.patterns.iter().filter_map(|p| compile_pattern(p)));
        }

        let mut intents: Vec<Vec<IntentMatcher>> =
            Category::ALL.iter().map(|_| Vec::new()).collect();
        for entry in INTENT_PATTERNS {
            let slot = &mut intents[entry.category.declaration_index()];
            for (intent, patterns) in entry.intents {
                let compiled: Vec<Regex> =
                    patterns.iter().filter_map(|p| compile_pattern(p)).collect();
                if !compiled.is_empty() {
                    slot.push(IntentMatcher {
                        intent: *intent,
                        patterns: compiled,
                    });
                }
            }
        }

        let mut hints = HashMap::with_capacity(KEYWORD_HINTS.len());
        for hint in KEYWORD_HINTS {
            hints.entry(hint.keyword).or_insert((hint.category, hint.weight));
        }

        Self {
            categories,
            intents,
            hints,
        }
    }

    /// Compiled match patterns for `category`.
    pub fn category_patterns(&self, category: Category) -> &[Regex] {
        self.categories
            .get(category.declaration_index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Compiled intent matchers for `category`, in check order.
    pub fn intent_matchers(&self, category: Category) -> &[IntentMatcher] {
        self.intents
            .get(category.declaration_index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The hint for a single lowercase token.
    pub fn keyword_hint(&self, token: &str) -> Option<(Category, f32)> {
        self.hints.get(token).copied()
    }

    /// First intent of `category` whose patterns match `text`.
    pub fn resolve_intent(&self, category: Category, text: &str) -> Intent {
        self.intent_matchers(category)
            .iter()
            .find(|m| m.is_match(text))
            .map(|m| m.intent)
            .unwrap_or(Intent::Unknown)
    }

    /// Capture groups of the first pattern of `category` that matches
    /// `text` with at least one non-empty group.
    ///
    /// Values are trimmed and stripped of trailing punctuation.
    pub fn captures(&self, category: Category, text: &str) -> Option<Captures> {
        for pattern in self.category_patterns(category) {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let mut values = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| clean_capture(m.as_str()))
                .filter(|v| !v.is_empty());
            if let Some(primary) = values.next() {
                return Some(Captures {
                    primary,
                    secondary: values.next(),
                });
            }
        }
        None
    }

    /// Number of compiled category and intent patterns.
    pub fn pattern_count(&self) -> usize {
        let categories: usize = self.categories.iter().map(Vec::len).sum();
        let intents: usize = self
            .intents
            .iter()
            .flat_map(|ms| ms.iter().map(|m| m.patterns.len()))
            .sum();
        categories + intents
    }

    /// Number of patterns declared in the static tables.
    pub fn declared_pattern_count() -> usize {
        let categories: usize = CATEGORY_PATTERNS.iter().map(|c| c.patterns.len()).sum();
        let intents: usize = INTENT_PATTERNS
            .iter()
            .flat_map(|c| c.intents.iter().map(|(_, ps)| ps.len()))
            .sum();
        categories + intents
    }
}

fn compile_pattern(source: &str) -> Option<Regex> {
    match RegexBuilder::new(source).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            error!(pattern = source, error = %e, "skipping malformed pattern");
            None
        }
    }
}

fn clean_capture(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ',' | ';' | ':'))
        .trim()
        .to_string()
}
