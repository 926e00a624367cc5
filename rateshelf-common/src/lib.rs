//! # RateShelf Common Library
//!
//! Shared code for the RateShelf server and client including:
//! - Wire models for collections and ratings
//! - Rating payload validation
//! - Configuration resolution
//! - Database schema initialization (feature `sqlx`)
//! - Timestamp and identifier helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod time;
pub mod uuid_utils;
pub mod validation;

pub use error::{Error, Result};
pub use models::{Collection, Rating};
