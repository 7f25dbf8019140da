mod history_handler;
mod history_store;
mod memory_history;

pub use history_handler::*;
pub use history_store::*;
pub use memory_history::*;
