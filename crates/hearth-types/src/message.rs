//! Persisted message shape.
//!
//! Storage collaborators keep conversations as a list of message rows,
//! each carrying its sender, content, timestamp and the classification of
//! the turn it belongs to. [`Turn::to_messages`] and
//! [`Turn::from_messages`] convert between that shape and the in-memory
//! [`Turn`] without losing any classification field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::Classification;
use crate::context::Turn;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One persisted message row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

impl Turn {
    /// Split a turn into its user and assistant message rows. Both rows
    /// carry the turn's classification.
    pub fn to_messages(&self) -> [StoredMessage; 2] {
        [
            StoredMessage {
                sender: Sender::User,
                content: self.utterance.clone(),
                timestamp: self.timestamp,
                classification: Some(self.classification.clone()),
            },
            StoredMessage {
                sender: Sender::Assistant,
                content: self.response.clone(),
                timestamp: self.timestamp,
                classification: Some(self.classification.clone()),
            },
        ]
    }

    /// Rebuild a turn from a user row followed by an assistant row.
    ///
    /// Returns `None` when the senders are not user-then-assistant or
    /// neither row carries a classification.
    pub fn from_messages(user: &StoredMessage, assistant: &StoredMessage) -> Option<Turn> {
        if user.sender != Sender::User || assistant.sender != Sender::Assistant {
            return None;
        }
        let classification = user
            .classification
            .clone()
            .or_else(|| assistant.classification.clone())?;
        Some(Turn {
            utterance: user.content.clone(),
            response: assistant.content.clone(),
            classification,
            timestamp: user.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{Category, EntityKind, Intent, Tool};

    fn sample_turn() -> Turn {
        let mut c = Classification::fallback(0.8);
        c.category = Category::LightingControl;
        c.intent = Intent::TurnOff;
        c.entities.push(EntityKind::Device, "light");
        c.entities.push(EntityKind::Room, "kitchen");
        c.required_tools.insert(Tool::SmartHome);
        Turn::new("turn off the kitchen light", "The light is now off.", c)
    }

    #[test]
    fn turn_survives_message_roundtrip_through_json() {
        let turn = sample_turn();
        let rows = turn.to_messages();
        let json = serde_json::to_string(&rows).unwrap();
        let back: Vec<StoredMessage> = serde_json::from_str(&json).unwrap();
        let rebuilt = Turn::from_messages(&back[0], &back[1]).unwrap();
        assert_eq!(rebuilt, turn);
    }

    #[test]
    fn from_messages_rejects_wrong_order() {
        let rows = sample_turn().to_messages();
        assert!(Turn::from_messages(&rows[1], &rows[0]).is_none());
    }

    #[test]
    fn from_messages_falls_back_to_assistant_classification() {
        let turn = sample_turn();
        let [mut user, assistant] = turn.to_messages();
        user.classification = None;
        let rebuilt = Turn::from_messages(&user, &assistant).unwrap();
        assert_eq!(rebuilt.classification, turn.classification);
    }

    #[test]
    fn from_messages_requires_some_classification() {
        let [mut user, mut assistant] = sample_turn().to_messages();
        user.classification = None;
        assistant.classification = None;
        assert!(Turn::from_messages(&user, &assistant).is_none());
    }
}
