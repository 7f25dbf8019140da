mod app_state;
mod router;
mod server;

pub use app_state::*;
pub use router::*;
pub use server::*;
