//! rateshelf-client library
//!
//! State containers that fetch, cache and mutate collections and ratings
//! over the REST API, plus the derived state the front end reads from them.

pub mod api;
pub mod collections;
pub mod messages;
pub mod picture;
pub mod ratings;
pub mod stats;
pub mod view;

pub use api::{ApiClient, ClientError, CollectionsApi, RatingsApi};
pub use collections::{CollectionsState, CollectionsStore};
pub use ratings::{RatingForm, RatingsState, RatingsStore};
pub use stats::Stats;
pub use view::SortMode;

/// Yes/no gate in front of destructive operations
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
