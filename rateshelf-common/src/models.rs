//! Wire models shared by the server and the client
//!
//! All JSON is camelCase. Identifiers travel as plain strings; the server
//! translates them to and from its storage form at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user-named grouping of ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Live count of ratings referencing this collection (never stored)
    #[serde(default)]
    pub rating_count: i64,
}

/// A single reviewed item belonging to exactly one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub collection_id: String,
    pub name: String,
    /// Image as a data URI; empty when the rating has no picture
    #[serde(default)]
    pub picture: String,
    pub rating: f64,
    pub review: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Rating {
    /// Ordering key for newest/oldest sorting
    ///
    /// Falls back to the id when no creation time is known so that the
    /// ordering stays total.
    pub fn creation_marker(&self) -> String {
        match &self.created_at {
            Some(ts) => crate::time::to_storage(ts),
            None => self.id.clone(),
        }
    }
}

/// POST /collections body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// PUT /collections/:id body; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCollectionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// POST /ratings/collection/:collectionId body
///
/// `rating` stays loosely typed until validation so that numeric strings
/// and out-of-range values get a specific message instead of a parse
/// failure. A `collectionId` sent by the client is accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

/// PUT /ratings/:id body; only supplied fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

/// Confirmation body returned by delete endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
