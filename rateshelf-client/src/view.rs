//! Derived rating view: search filter plus sort order

use rateshelf_common::Rating;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sort order of the derived view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "name-desc")]
    NameDesc,
    /// Highest score first
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "rating-low")]
    RatingLow,
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::Name,
        SortMode::NameDesc,
        SortMode::Rating,
        SortMode::RatingLow,
        SortMode::Newest,
        SortMode::Oldest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Name => "name",
            SortMode::NameDesc => "name-desc",
            SortMode::Rating => "rating",
            SortMode::RatingLow => "rating-low",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
        }
    }

    fn compare(self, a: &Rating, b: &Rating) -> Ordering {
        match self {
            SortMode::Name => compare_names(&a.name, &b.name),
            SortMode::NameDesc => compare_names(&b.name, &a.name),
            SortMode::Rating => b.rating.total_cmp(&a.rating),
            SortMode::RatingLow => a.rating.total_cmp(&b.rating),
            SortMode::Newest => b.creation_marker().cmp(&a.creation_marker()),
            SortMode::Oldest => a.creation_marker().cmp(&b.creation_marker()),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown sort mode '{0}' (expected name, name-desc, rating, rating-low, newest or oldest)")]
pub struct UnknownSortMode(String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownSortMode(s.to_string()))
    }
}

/// Case-insensitive first, then exact, so distinct names never tie
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Case-insensitive substring match against name or review
pub fn matches_search(rating: &Rating, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    rating.name.to_lowercase().contains(&needle) || rating.review.to_lowercase().contains(&needle)
}

/// Filter by `search`, then order by `sort`
pub fn filter_and_sort(ratings: &[Rating], search: &str, sort: SortMode) -> Vec<Rating> {
    let mut view: Vec<Rating> = ratings
        .iter()
        .filter(|r| matches_search(r, search))
        .cloned()
        .collect();
    view.sort_by(|a, b| sort.compare(a, b));
    view
}
