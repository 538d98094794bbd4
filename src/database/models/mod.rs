pub mod change_log;
pub mod lesson;
pub mod user;

pub use change_log::{ChangeFilter, ChangeRecord};
pub use lesson::LessonSummary;
pub use user::UserProfile;
