//! Deferred notification routing.
//!
//! [`NotificationRouter`] consumes the domain event bus and performs the
//! actual notification inserts, decoupled from the mutations that
//! triggered them.

pub mod router;

pub use router::NotificationRouter;
