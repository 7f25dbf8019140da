mod chat;
mod connection;
mod room;
mod signaling;
mod user;

pub use chat::{ChatDraft, ChatMessage, unix_millis};
pub use connection::ConnectionId;
pub use room::RoomId;
pub use signaling::{ClientMessage, IceServerConfig, ProtocolError, ServerMessage};
pub use user::UserId;
