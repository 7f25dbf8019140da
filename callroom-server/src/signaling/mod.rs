mod gateway;
mod signaling_output;
mod ws_handler;

pub use gateway::*;
pub use signaling_output::*;
pub use ws_handler::*;
