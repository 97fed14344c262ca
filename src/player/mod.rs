pub mod adapter;
pub mod backend;
pub mod loader;

pub use adapter::{AdapterSignal, PlayerAdapter};
pub use backend::{PlayerBackend, PlayerError, RawPlayerEvent, SharedPlayerBackend};
pub use loader::ScriptLoader;
