//! Identifier utilities
//!
//! Entities are keyed by UUIDv4 internally and surfaced as plain strings on
//! the wire.

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse an identifier received over the wire
///
/// Returns `None` for anything that is not a well-formed UUID, which callers
/// treat the same as an identifier that does not exist.
pub fn parse(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s.trim()).ok()
}
