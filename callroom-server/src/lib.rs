pub mod app;
pub mod config;
pub mod history;
pub mod room;
pub mod signaling;

pub use app::*;
pub use config::*;
pub use history::*;
pub use room::*;
pub use signaling::*;
