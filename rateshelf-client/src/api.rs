//! HTTP client for the rateshelf REST API
//!
//! The state containers talk to the server through the [`CollectionsApi`]
//! and [`RatingsApi`] traits so they can run against an in-process fake.

use async_trait::async_trait;
use rateshelf_common::models::{
    CreateCollectionRequest, ErrorBody, RatingPatch, RatingPayload, UpdateCollectionRequest,
};
use rateshelf_common::{Collection, Rating};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("rateshelf/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout or body decoding failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server responded {status}: {}", message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },
}

impl ClientError {
    /// The `error` field of the server's response body, when there was one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            ClientError::Request(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Collection operations used by the collections container
#[async_trait]
pub trait CollectionsApi: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<Collection>, ClientError>;

    async fn create_collection(
        &self,
        request: &CreateCollectionRequest,
    ) -> Result<Collection, ClientError>;

    async fn update_collection(
        &self,
        id: &str,
        request: &UpdateCollectionRequest,
    ) -> Result<Collection, ClientError>;

    async fn delete_collection(&self, id: &str) -> Result<(), ClientError>;
}

/// Rating operations used by the ratings container
#[async_trait]
pub trait RatingsApi: Send + Sync {
    async fn list_ratings(&self, collection_id: &str) -> Result<Vec<Rating>, ClientError>;

    async fn create_rating(
        &self,
        collection_id: &str,
        payload: &RatingPayload,
    ) -> Result<Rating, ClientError>;

    async fn update_rating(&self, id: &str, patch: &RatingPatch) -> Result<Rating, ClientError>;

    async fn delete_rating(&self, id: &str) -> Result<(), ClientError>;
}

/// reqwest-backed client for a running rateshelf-server
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:5730`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /health
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        decode(response).await
    }
}

/// Turn a response into `T`, or into [`ClientError::Status`] for non-2xx
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let response = check(response).await?;
    Ok(response.json::<T>().await?)
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.json::<ErrorBody>().await.ok().map(|body| body.error);
    debug!("{} responded {}: {:?}", USER_AGENT, status, message);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CollectionsApi for ApiClient {
    async fn list_collections(&self) -> Result<Vec<Collection>, ClientError> {
        let response = self.http.get(self.url("/collections")).send().await?;
        decode(response).await
    }

    async fn create_collection(
        &self,
        request: &CreateCollectionRequest,
    ) -> Result<Collection, ClientError> {
        let response = self
            .http
            .post(self.url("/collections"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_collection(
        &self,
        id: &str,
        request: &UpdateCollectionRequest,
    ) -> Result<Collection, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/collections/{}", id)))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_collection(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/collections/{}", id)))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}

#[async_trait]
impl RatingsApi for ApiClient {
    async fn list_ratings(&self, collection_id: &str) -> Result<Vec<Rating>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/ratings/collection/{}", collection_id)))
            .send()
            .await?;
        decode(response).await
    }

    async fn create_rating(
        &self,
        collection_id: &str,
        payload: &RatingPayload,
    ) -> Result<Rating, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/ratings/collection/{}", collection_id)))
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_rating(&self, id: &str, patch: &RatingPatch) -> Result<Rating, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/ratings/{}", id)))
            .json(patch)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_rating(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/ratings/{}", id)))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:5730/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5730");
        assert_eq!(client.url("/collections"), "http://localhost:5730/collections");
    }

    #[test]
    fn test_server_message_only_for_status_errors() {
        let err = ClientError::Status {
            status: 400,
            message: Some("Name is required".to_string()),
        };
        assert_eq!(err.server_message(), Some("Name is required"));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Server responded 400: Name is required");
    }
}
