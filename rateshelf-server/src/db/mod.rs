//! Store queries for rateshelf-server
//!
//! Identifiers are stored as UUID text in `guid` columns and timestamps as
//! fixed-width RFC 3339 text, so `ORDER BY created_at` sorts by time.

pub mod collections;
pub mod ratings;
pub mod transfer;

pub use rateshelf_common::db::init::{init_database, init_memory_database};

/// Parse a stored timestamp column, surfacing corruption as a decode error
pub(crate) fn decode_timestamp(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, sqlx::Error> {
    rateshelf_common::time::from_storage(raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("invalid stored timestamp: {}", raw).into()))
}
