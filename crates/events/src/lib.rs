//! Taskhive event bus and deferred side-effect infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Mutation handlers publish fire-and-forget;
//!   a failure to deliver never fails the originating request.
//! - [`DomainEvent`] — the canonical event envelope carrying the acting
//!   user, the affected task, and the precomputed recipient set.
//! - [`ReminderScheduler`] — periodic scanner that turns approaching task
//!   due dates into `due_date_reminder` notifications.

pub mod bus;
pub mod reminder;

pub use bus::{DomainEvent, EventBus, EventKind};
pub use reminder::ReminderScheduler;
