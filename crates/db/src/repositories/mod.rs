//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row invariants
//! (cascade deletes, category release) run inside a single transaction.

pub mod calendar_event_repo;
pub mod category_repo;
pub mod comment_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod session_repo;
pub mod stored_object_repo;
pub mod task_repo;
pub mod user_repo;

pub use calendar_event_repo::CalendarEventRepo;
pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use stored_object_repo::StoredObjectRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
