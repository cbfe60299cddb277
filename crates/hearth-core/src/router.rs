//! System router and [`SystemHandler`] trait definition.
//!
//! The planner only describes actions; the router executes them by
//! looking up the target system by name and handing over the command and
//! parameters. Every failure (unknown system, unknown command, bad
//! parameters, handler error) becomes a failed [`ExecutionResult`], so a
//! dispatch never aborts the turn.
//!
//! [`SystemRouter::simulated`] registers in-process stand-ins for the
//! seven systems the planner targets. They validate parameters and report what
//! they would have done, which is enough for the CLI and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use hearth_types::action::{ActionDescriptor, ActionOutcome, ExecutionResult};
use serde_json::Value;
use tracing::{debug, warn};

use crate::pipeline::planner::systems;

/// Error type for system execution.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// No handler is registered under the requested system name.
    #[error("system not found: {0}")]
    UnknownSystem(String),

    /// The system does not understand the command.
    #[error("unknown command '{command}' for system '{system}'")]
    UnknownCommand { system: String, command: String },

    /// Parameters are missing or out of range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The system failed while executing.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Action parameters as carried by [`ActionDescriptor`].
pub type Parameters = BTreeMap<String, Value>;

/// An external system the router can dispatch to.
#[async_trait]
pub trait SystemHandler: Send + Sync {
    /// Name actions use to address this system.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Commands this system accepts.
    fn commands(&self) -> &[&'static str];

    /// Execute `command` with `parameters`.
    async fn execute(
        &self,
        command: &str,
        parameters: &Parameters,
    ) -> Result<ExecutionResult, RouteError>;
}

/// Registry of systems keyed by name.
pub struct SystemRouter {
    systems: HashMap<String, Arc<dyn SystemHandler>>,
}

impl SystemRouter {
    /// Empty router.
    pub fn new() -> Self {
        Self {
            systems: HashMap::new(),
        }
    }

    /// Router with every simulated system the planner can target.
    pub fn simulated() -> Self {
        let mut router = Self::new();
        router.register(Arc::new(SpotifySystem));
        router.register(Arc::new(HueSystem));
        router.register(Arc::new(CalendarSystem));
        router.register(Arc::new(HomeAssistantSystem));
        router.register(Arc::new(SearchSystem));
        router.register(Arc::new(ContactsSystem));
        router.register(Arc::new(LocationSystem));
        router
    }

    /// Register a system, replacing any with the same name.
    pub fn register(&mut self, handler: Arc<dyn SystemHandler>) {
        let name = handler.name().to_string();
        debug!(system = %name, "registering system");
        self.systems.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn SystemHandler>> {
        self.systems.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.systems.contains_key(name)
    }

    /// Registered system names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.systems.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Execute one action. Never fails; errors become a failed result.
    pub async fn execute(&self, action: &ActionDescriptor) -> ExecutionResult {
        match self.try_execute(action).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    system = %action.system,
                    command = %action.command,
                    error = %e,
                    "action failed"
                );
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    async fn try_execute(&self, action: &ActionDescriptor) -> Result<ExecutionResult, RouteError> {
        let handler = self
            .systems
            .get(&action.system)
            .ok_or_else(|| RouteError::UnknownSystem(action.system.clone()))?;
        if !handler.commands().contains(&action.command.as_str()) {
            return Err(RouteError::UnknownCommand {
                system: action.system.clone(),
                command: action.command.clone(),
            });
        }
        debug!(system = %action.system, command = %action.command, "dispatching action");
        handler.execute(&action.command, &action.parameters).await
    }

    /// Execute every action in order, collecting one outcome per action.
    pub async fn dispatch_all(&self, actions: &[ActionDescriptor]) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            let result = self.execute(action).await;
            outcomes.push(ActionOutcome {
                action: action.clone(),
                result,
            });
        }
        outcomes
    }
}

impl Default for SystemRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemRouter")
            .field("systems", &self.names())
            .finish()
    }
}

// ── Parameter helpers ───────────────────────────────────────────────────

fn str_param<'a>(params: &'a Parameters, key: &str) -> Result<&'a str, RouteError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RouteError::InvalidParameters(format!("missing '{key}'")))
}

fn int_param(params: &Parameters, key: &str, range: std::ops::RangeInclusive<i64>) -> Result<i64, RouteError> {
    let value = params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| RouteError::InvalidParameters(format!("missing integer '{key}'")))?;
    if !range.contains(&value) {
        return Err(RouteError::InvalidParameters(format!(
            "'{key}' must be within {}..={}, got {value}",
            range.start(),
            range.end()
        )));
    }
    Ok(value)
}

fn unknown(system: &str, command: &str) -> RouteError {
    RouteError::UnknownCommand {
        system: system.to_string(),
        command: command.to_string(),
    }
}

// ── Simulated systems ───────────────────────────────────────────────────

/// Music playback stand-in.
pub struct SpotifySystem;

#[async_trait]
impl SystemHandler for SpotifySystem {
    fn name(&self) -> &str {
        systems::SPOTIFY
    }
    fn description(&self) -> &str {
        "Music playback"
    }
    fn commands(&self) -> &[&'static str] {
        &["search_and_play", "pause", "set_volume", "next_track", "previous_track"]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        let result = match command {
            "search_and_play" => {
                let query = str_param(params, "query")?;
                ExecutionResult::ok(format!("Now playing: {query}")).with_payload("query", query)
            }
            "pause" => ExecutionResult::ok("Playback paused"),
            "set_volume" => {
                let volume = int_param(params, "volume", 0..=100)?;
                ExecutionResult::ok(format!("Volume set to {volume}")).with_payload("volume", volume)
            }
            "next_track" => ExecutionResult::ok("Skipped to next track"),
            "previous_track" => ExecutionResult::ok("Went back to previous track"),
            other => return Err(unknown(self.name(), other)),
        };
        Ok(result)
    }
}

/// Smart lighting stand-in.
pub struct HueSystem;

#[async_trait]
impl SystemHandler for HueSystem {
    fn name(&self) -> &str {
        systems::PHILIPS_HUE
    }
    fn description(&self) -> &str {
        "Smart lighting"
    }
    fn commands(&self) -> &[&'static str] {
        &["turn_on_light", "turn_off_light", "set_brightness", "set_color"]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        let device = str_param(params, "device")?;
        let room = str_param(params, "room")?;
        let result = match command {
            "turn_on_light" => ExecutionResult::ok(format!("Turned on {device} in {room}")),
            "turn_off_light" => ExecutionResult::ok(format!("Turned off {device} in {room}")),
            "set_brightness" => {
                let level = int_param(params, "brightness", 0..=100)?;
                ExecutionResult::ok(format!("Set {device} in {room} to {level}%"))
                    .with_payload("brightness", level)
            }
            "set_color" => {
                let color = str_param(params, "color")?;
                ExecutionResult::ok(format!("Set {device} in {room} to {color}"))
                    .with_payload("color", color)
            }
            other => return Err(unknown(self.name(), other)),
        };
        Ok(result.with_payload("device", device).with_payload("room", room))
    }
}

/// Calendar stand-in.
pub struct CalendarSystem;

#[async_trait]
impl SystemHandler for CalendarSystem {
    fn name(&self) -> &str {
        systems::GOOGLE_CALENDAR
    }
    fn description(&self) -> &str {
        "Calendar events"
    }
    fn commands(&self) -> &[&'static str] {
        &["create_event", "cancel_event", "get_upcoming_events"]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        let result = match command {
            "create_event" => {
                let title = str_param(params, "title")?;
                let time = str_param(params, "time")?;
                ExecutionResult::ok(format!("Created event '{title}' for {time}"))
                    .with_payload("title", title)
                    .with_payload("time", time)
            }
            "cancel_event" => {
                let title = str_param(params, "title")?;
                ExecutionResult::ok(format!("Cancelled event '{title}'")).with_payload("title", title)
            }
            "get_upcoming_events" => {
                let days = int_param(params, "days_ahead", 1..=365)?;
                ExecutionResult::ok(format!("No events in the next {days} day(s)"))
                    .with_payload("events", Value::Array(Vec::new()))
            }
            other => return Err(unknown(self.name(), other)),
        };
        Ok(result)
    }
}

/// Home automation stand-in.
pub struct HomeAssistantSystem;

#[async_trait]
impl SystemHandler for HomeAssistantSystem {
    fn name(&self) -> &str {
        systems::HOME_ASSISTANT
    }
    fn description(&self) -> &str {
        "Thermostat, locks, security and generic devices"
    }
    fn commands(&self) -> &[&'static str] {
        &[
            "set_temperature",
            "lock_door",
            "unlock_door",
            "arm_security",
            "disarm_security",
            "get_state",
            "turn_on",
            "turn_off",
        ]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        let result = match command {
            "set_temperature" => {
                let t = int_param(params, "temperature", 5..=95)?;
                ExecutionResult::ok(format!("Thermostat set to {t}")).with_payload("temperature", t)
            }
            "lock_door" => ExecutionResult::ok(format!("Locked {}", str_param(params, "door")?)),
            "unlock_door" => ExecutionResult::ok(format!("Unlocked {}", str_param(params, "door")?)),
            "arm_security" => ExecutionResult::ok("Security system armed"),
            "disarm_security" => ExecutionResult::ok("Security system disarmed"),
            "get_state" => {
                let device = str_param(params, "device")?;
                ExecutionResult::ok(format!("{device} is online")).with_payload("state", "on")
            }
            "turn_on" => ExecutionResult::ok(format!("Turned on {}", str_param(params, "device")?)),
            "turn_off" => ExecutionResult::ok(format!("Turned off {}", str_param(params, "device")?)),
            other => return Err(unknown(self.name(), other)),
        };
        Ok(result)
    }
}

/// Web search stand-in.
pub struct SearchSystem;

#[async_trait]
impl SystemHandler for SearchSystem {
    fn name(&self) -> &str {
        systems::SEARCH
    }
    fn description(&self) -> &str {
        "Web search"
    }
    fn commands(&self) -> &[&'static str] {
        &["web_search"]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        match command {
            "web_search" => {
                let query = str_param(params, "query")?;
                Ok(ExecutionResult::ok(format!("Search queued for '{query}'"))
                    .with_payload("query", query))
            }
            other => Err(unknown(self.name(), other)),
        }
    }
}

/// Address book and phone stand-in.
pub struct ContactsSystem;

#[async_trait]
impl SystemHandler for ContactsSystem {
    fn name(&self) -> &str {
        systems::CONTACTS
    }
    fn description(&self) -> &str {
        "Contacts, calls and messages"
    }
    fn commands(&self) -> &[&'static str] {
        &["call", "send_message", "search_contact"]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        let name = str_param(params, "name")?;
        let result = match command {
            "call" => ExecutionResult::ok(format!("Calling {name}")),
            "send_message" => {
                let result = ExecutionResult::ok(format!("Message sent to {name}"));
                match params.get("message").and_then(Value::as_str) {
                    Some(body) => result.with_payload("message", body),
                    None => result,
                }
            }
            "search_contact" => ExecutionResult::ok(format!("Found contact: {name}")),
            other => return Err(unknown(self.name(), other)),
        };
        Ok(result.with_payload("name", name))
    }
}

/// Location and maps stand-in.
pub struct LocationSystem;

#[async_trait]
impl SystemHandler for LocationSystem {
    fn name(&self) -> &str {
        systems::LOCATION_SERVICES
    }
    fn description(&self) -> &str {
        "Current location, directions and places nearby"
    }
    fn commands(&self) -> &[&'static str] {
        &["get_location", "get_directions", "find_nearby"]
    }

    async fn execute(&self, command: &str, params: &Parameters) -> Result<ExecutionResult, RouteError> {
        let result = match command {
            "get_location" => ExecutionResult::ok("Retrieved current location"),
            "get_directions" => {
                let destination = str_param(params, "destination")?;
                ExecutionResult::ok(format!("Directions to {destination}"))
                    .with_payload("destination", destination)
            }
            "find_nearby" => {
                let query = str_param(params, "query")?;
                ExecutionResult::ok(format!("Found {query} nearby")).with_payload("query", query)
            }
            other => return Err(unknown(self.name(), other)),
        };
        Ok(result)
    }
}
