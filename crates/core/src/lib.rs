//! Shared primitives for the Taskhive backend.
//!
//! - [`error`] -- the domain error taxonomy used across crates.
//! - [`types`] -- id and timestamp aliases matching the database schema.
//! - [`assign`] -- assignment-set arithmetic for notification fan-out.
//! - [`color`] -- hex color validation for user-supplied colors.
//! - [`upload`] -- signed one-time upload token generation and validation.

pub mod assign;
pub mod color;
pub mod error;
pub mod types;
pub mod upload;
