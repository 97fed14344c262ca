pub mod app;
pub mod components;
pub mod context;
pub mod embed_player;

pub use app::*;
pub use components::*;
pub use context::AppContext;

// Re-export constants from app module
pub use app::{MAIN_CSS, TAILWIND_CSS};
