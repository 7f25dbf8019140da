mod coordinator;
mod room_command;
mod room_table;

pub use coordinator::*;
pub use room_command::*;
pub use room_table::*;
