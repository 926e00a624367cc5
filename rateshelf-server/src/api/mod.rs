//! HTTP API handlers for rateshelf-server

pub mod collections;
pub mod health;
pub mod ratings;

pub use collections::collection_routes;
pub use health::health_routes;
pub use ratings::rating_routes;
