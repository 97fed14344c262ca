pub mod events;
pub mod service;
pub mod sync;
pub mod watch;

pub use events::{SessionEvent, SessionEventsHandle};
pub use service::{LessonHandle, LessonSession, SessionCommand, SessionConfig};
pub use sync::{ItemProgressRecord, ProgressSynchronizer, SyncPhase};
pub use watch::{CompletionGate, WatchState};
