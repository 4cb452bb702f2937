//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for partial patches

pub mod calendar_event;
pub mod category;
pub mod comment;
pub mod notification;
pub mod project;
pub mod session;
pub mod stored_object;
pub mod task;
pub mod user;
