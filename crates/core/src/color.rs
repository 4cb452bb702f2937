//! Validation for user-supplied display colors.
//!
//! Projects, categories, and calendar events carry a color chosen by the
//! client. Only six-digit hex values (e.g. `#3b82f6`) are accepted; the
//! database stores the string verbatim.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;

static HEX_COLOR: OnceLock<Regex> = OnceLock::new();

fn hex_color() -> &'static Regex {
    HEX_COLOR.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("static pattern compiles"))
}

/// Validate a display color, returning `Err(CoreError::Validation)` when the
/// value is not a `#rrggbb` hex string.
pub fn validate_color(value: &str) -> Result<(), CoreError> {
    if hex_color().is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid color '{value}'. Expected a hex value like #3b82f6"
        )))
    }
}
