pub mod certificate;
pub mod lesson;
pub mod login;
pub mod navbar;
pub mod session_hooks;
pub mod trail_details;
pub mod trails;

pub use certificate::CertificateView;
pub use lesson::Lesson;
pub use login::Login;
pub use navbar::Navbar;
pub use session_hooks::{use_lesson_session, LessonViewState};
pub use trail_details::TrailDetails;
pub use trails::Trails;
