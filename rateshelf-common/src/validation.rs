//! Rating and collection payload validation
//!
//! Pure functions: no I/O, no clock except when the caller supplies a
//! timestamp to parse. Rules run in a fixed order and the first failure wins:
//!
//! 1. `name` present and non-empty after trimming
//! 2. `rating` present, numeric, within [0, 10] inclusive
//! 3. `review` present and non-empty after trimming

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::models::{RatingPatch, RatingPayload};

/// Lowest accepted score
pub const MIN_RATING: f64 = 0.0;
/// Highest accepted score
pub const MAX_RATING: f64 = 10.0;

/// Reason a payload was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Rating is required")]
    RatingRequired,

    #[error("Rating must be a number")]
    RatingNotNumeric,

    #[error("Rating must be between 0 and 10")]
    RatingOutOfRange,

    #[error("Review is required")]
    ReviewRequired,

    #[error("createdAt must be an ISO 8601 date or timestamp")]
    InvalidCreatedAt,

    #[error("Collection name is required")]
    CollectionNameRequired,
}

/// A rating payload that passed validation, with strings already trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct RatingDraft {
    pub name: String,
    pub picture: String,
    pub rating: f64,
    pub review: String,
    /// Client-supplied creation time, if any
    pub created_at: Option<DateTime<Utc>>,
}

/// The subset of rating fields an update supplied, validated and trimmed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingChanges {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub rating: Option<f64>,
    pub review: Option<String>,
}

impl RatingChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.picture.is_none()
            && self.rating.is_none()
            && self.review.is_none()
    }
}

/// Whether a score lies in the accepted inclusive range
pub fn is_valid_score(score: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&score)
}

/// Coerce a loosely-typed rating into a number
///
/// Numbers pass through; strings are parsed the way a form field would be.
/// NaN and infinities are not numeric.
pub fn coerce_score(value: &Value) -> Result<f64, ValidationError> {
    let score = match value {
        Value::Null => return Err(ValidationError::RatingRequired),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Err(ValidationError::RatingRequired),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match score {
        Some(score) if score.is_finite() => Ok(score),
        _ => Err(ValidationError::RatingNotNumeric),
    }
}

fn required_text(value: Option<&str>, err: ValidationError) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(err),
    }
}

fn checked_score(value: &Value) -> Result<f64, ValidationError> {
    let score = coerce_score(value)?;
    if !is_valid_score(score) {
        return Err(ValidationError::RatingOutOfRange);
    }
    Ok(score)
}

/// Validate a new rating payload
pub fn validate_rating(payload: &RatingPayload) -> Result<RatingDraft, ValidationError> {
    let name = required_text(payload.name.as_deref(), ValidationError::NameRequired)?;

    let rating = match &payload.rating {
        Some(value) => checked_score(value)?,
        None => return Err(ValidationError::RatingRequired),
    };

    let review = required_text(payload.review.as_deref(), ValidationError::ReviewRequired)?;

    let created_at = match payload.created_at.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            crate::time::parse_client_timestamp(raw).ok_or(ValidationError::InvalidCreatedAt)?,
        ),
    };

    Ok(RatingDraft {
        name,
        picture: payload.picture.clone().unwrap_or_default(),
        rating,
        review,
        created_at,
    })
}

/// Validate a partial rating update
///
/// Each supplied field must satisfy the same rule as on creation; absent
/// fields are left alone. A `null` rating counts as absent.
pub fn validate_rating_patch(patch: &RatingPatch) -> Result<RatingChanges, ValidationError> {
    let name = match patch.name.as_deref() {
        Some(name) => Some(required_text(Some(name), ValidationError::NameRequired)?),
        None => None,
    };

    let rating = match &patch.rating {
        None | Some(Value::Null) => None,
        Some(value) => Some(checked_score(value)?),
    };

    let review = match patch.review.as_deref() {
        Some(review) => Some(required_text(Some(review), ValidationError::ReviewRequired)?),
        None => None,
    };

    Ok(RatingChanges {
        name,
        picture: patch.picture.clone(),
        rating,
        review,
    })
}

/// Validate a collection name, returning it trimmed
pub fn validate_collection_name(name: Option<&str>) -> Result<String, ValidationError> {
    required_text(name, ValidationError::CollectionNameRequired)
}
