//! Action descriptors and execution results.
//!
//! An [`ActionDescriptor`] is a structured, not-yet-executed request to an
//! external system (music, lighting, calendar, search, ...). Planners
//! produce them; the system router consumes them and answers with an
//! [`ExecutionResult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request for one external system to run one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Target system (e.g. `"spotify"`, `"philips_hue"`).
    pub system: String,

    /// Command understood by that system (e.g. `"search_and_play"`).
    pub command: String,

    /// Command parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl ActionDescriptor {
    /// Create a descriptor with no parameters.
    pub fn new(system: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            command: command.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// A string parameter.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// An integer parameter.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.parameters.get(key).and_then(Value::as_i64)
    }
}

/// What a system reported after running a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Human-readable outcome (or error description).
    pub message: String,

    /// Optional structured data returned by the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Map<String, Value>>,
}

impl ExecutionResult {
    /// A successful result.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: None,
        }
    }

    /// A failed result.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }

    /// Attach a payload entry.
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A descriptor paired with the result of executing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: ActionDescriptor,
    pub result: ExecutionResult,
}
