use crate::model::chat::{ChatMessage, deserialize_timestamp};
use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use crate::model::user::UserId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Why an inbound frame was rejected. Rejected frames are dropped, never relayed.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a valid envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("unknown op '{0}'")]
    UnknownOp(String),

    #[error("op '{0}' has no body")]
    MissingBody(&'static str),

    #[error("invalid body for op '{op}': {source}")]
    InvalidBody {
        op: &'static str,
        source: serde_json::Error,
    },

    #[error("op '{op}' requires a non-empty '{field}'")]
    EmptyField {
        op: &'static str,
        field: &'static str,
    },
}

/// Messages sent by a browser client.
///
/// Negotiation payloads (`sdp`, `candidate`) are kept as raw JSON so they are
/// relayed exactly as the client wrote them.
#[derive(Debug)]
pub enum ClientMessage {
    Join {
        room: RoomId,
    },
    Leave {
        room: RoomId,
    },
    Offer {
        room: RoomId,
        sdp: Box<RawValue>,
    },
    Answer {
        room: RoomId,
        sdp: Box<RawValue>,
    },
    IceCandidate {
        room: RoomId,
        candidate: Box<RawValue>,
    },
    Typing {
        room: RoomId,
        user_id: UserId,
    },
    StopTyping {
        room: RoomId,
        user_id: UserId,
    },
    ChatText {
        room: RoomId,
        text: String,
        sender: UserId,
        receiver: UserId,
        timestamp: Option<u64>,
    },
    /// In-call chat. Not room-scoped: goes to every other connection.
    CallChat {
        text: String,
        sender: String,
        sid: String,
    },
}

/// Messages pushed to a browser client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", content = "d", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Offer {
        sdp: Box<RawValue>,
    },
    Answer {
        sdp: Box<RawValue>,
    },
    IceCandidate {
        candidate: Box<RawValue>,
    },
    Typing {
        user_id: UserId,
    },
    StopTyping {
        user_id: UserId,
    },
    ChatText(ChatMessage),
    CallChat {
        text: String,
        sender: String,
        sid: String,
    },
}

#[derive(Deserialize)]
struct Envelope {
    op: String,
    #[serde(default)]
    d: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct RoomBody {
    room: RoomId,
}

#[derive(Deserialize)]
struct SdpBody {
    room: RoomId,
    sdp: Box<RawValue>,
}

#[derive(Deserialize)]
struct CandidateBody {
    room: RoomId,
    candidate: Box<RawValue>,
}

#[derive(Deserialize)]
struct TypingBody {
    room: RoomId,
    user_id: UserId,
}

#[derive(Deserialize)]
struct ChatBody {
    room: RoomId,
    text: String,
    sender: UserId,
    receiver: UserId,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    timestamp: Option<u64>,
}

#[derive(Deserialize)]
struct CallChatBody {
    text: String,
    sender: String,
    sid: String,
}

fn body<T: DeserializeOwned>(op: &'static str, d: Option<&RawValue>) -> Result<T, ProtocolError> {
    let raw = d.ok_or(ProtocolError::MissingBody(op))?;
    serde_json::from_str(raw.get()).map_err(|source| ProtocolError::InvalidBody { op, source })
}

fn require(op: &'static str, field: &'static str, empty: bool) -> Result<(), ProtocolError> {
    if empty {
        return Err(ProtocolError::EmptyField { op, field });
    }
    Ok(())
}

impl ClientMessage {
    /// Parse and validate one text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let d = envelope.d.as_deref();

        let message = match envelope.op.as_str() {
            "join" => {
                let b: RoomBody = body("join", d)?;
                Self::Join { room: b.room }
            }
            "leave" => {
                let b: RoomBody = body("leave", d)?;
                Self::Leave { room: b.room }
            }
            "offer" => {
                let b: SdpBody = body("offer", d)?;
                Self::Offer {
                    room: b.room,
                    sdp: b.sdp,
                }
            }
            "answer" => {
                let b: SdpBody = body("answer", d)?;
                Self::Answer {
                    room: b.room,
                    sdp: b.sdp,
                }
            }
            "ice_candidate" => {
                let b: CandidateBody = body("ice_candidate", d)?;
                Self::IceCandidate {
                    room: b.room,
                    candidate: b.candidate,
                }
            }
            "typing" => {
                let b: TypingBody = body("typing", d)?;
                Self::Typing {
                    room: b.room,
                    user_id: b.user_id,
                }
            }
            "stop_typing" => {
                let b: TypingBody = body("stop_typing", d)?;
                Self::StopTyping {
                    room: b.room,
                    user_id: b.user_id,
                }
            }
            "chat_text" => {
                let b: ChatBody = body("chat_text", d)?;
                Self::ChatText {
                    room: b.room,
                    text: b.text,
                    sender: b.sender,
                    receiver: b.receiver,
                    timestamp: b.timestamp,
                }
            }
            "call_chat" => {
                let b: CallChatBody = body("call_chat", d)?;
                Self::CallChat {
                    text: b.text,
                    sender: b.sender,
                    sid: b.sid,
                }
            }
            other => return Err(ProtocolError::UnknownOp(other.to_owned())),
        };

        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        let op = self.op();
        if let Some(room) = self.room() {
            require(op, "room", room.is_empty())?;
        }

        match self {
            Self::Typing { user_id, .. } | Self::StopTyping { user_id, .. } => {
                require(op, "user_id", user_id.is_empty())
            }
            Self::ChatText {
                text,
                sender,
                receiver,
                ..
            } => {
                require(op, "text", text.is_empty())?;
                require(op, "sender", sender.is_empty())?;
                require(op, "receiver", receiver.is_empty())
            }
            _ => Ok(()),
        }
    }

    pub fn op(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice_candidate",
            Self::Typing { .. } => "typing",
            Self::StopTyping { .. } => "stop_typing",
            Self::ChatText { .. } => "chat_text",
            Self::CallChat { .. } => "call_chat",
        }
    }

    /// The room this message is addressed to, if it is room-scoped.
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Self::Join { room }
            | Self::Leave { room }
            | Self::Offer { room, .. }
            | Self::Answer { room, .. }
            | Self::IceCandidate { room, .. }
            | Self::Typing { room, .. }
            | Self::StopTyping { room, .. }
            | Self::ChatText { room, .. } => Some(room),
            Self::CallChat { .. } => None,
        }
    }
}

impl ServerMessage {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::IceConfig { .. } => "ice_config",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice_candidate",
            Self::Typing { .. } => "typing",
            Self::StopTyping { .. } => "stop_typing",
            Self::ChatText(_) => "chat_text",
            Self::CallChat { .. } => "call_chat",
        }
    }
}
