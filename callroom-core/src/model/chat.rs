use crate::model::room::RoomId;
use crate::model::user::UserId;
use chrono::DateTime;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A text message exchanged inside a room and kept by the history store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: UserId,
    pub receiver: UserId,
    pub room: RoomId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// A chat message as submitted by a client, before the server stamps it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatDraft {
    pub text: String,
    pub sender: UserId,
    pub receiver: UserId,
    pub room: RoomId,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<u64>,
}

impl ChatDraft {
    /// Name of the first required field left empty, if any.
    pub fn empty_field(&self) -> Option<&'static str> {
        if self.room.is_empty() {
            Some("room")
        } else if self.text.is_empty() {
            Some("text")
        } else if self.sender.is_empty() {
            Some("sender")
        } else if self.receiver.is_empty() {
            Some("receiver")
        } else {
            None
        }
    }

    /// Turn into a stored message, using the current time when none was given.
    pub fn stamp(self) -> ChatMessage {
        ChatMessage {
            text: self.text,
            sender: self.sender,
            receiver: self.receiver,
            room: self.room,
            timestamp: self.timestamp.unwrap_or_else(unix_millis),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(u64),
    Text(String),
    Other(IgnoredAny),
}

impl WireTimestamp {
    fn into_millis(self) -> Option<u64> {
        match self {
            Self::Millis(ms) => Some(ms),
            Self::Text(text) => DateTime::parse_from_rfc3339(&text)
                .ok()
                .and_then(|t| u64::try_from(t.timestamp_millis()).ok()),
            Self::Other(_) => None,
        }
    }
}

/// Reads a client timestamp given either as epoch milliseconds or as an
/// RFC 3339 string. Anything else reads as absent.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WireTimestamp>::deserialize(deserializer)?.and_then(WireTimestamp::into_millis))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
/// Saturates at `u64::MAX`; a clock before the epoch reads as 0.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
