//! Ratings state container for the selected collection
//!
//! Holds the loaded ratings, the add/edit form and the search/sort settings.
//! The derived view and statistics are recomputed on every read.

use rateshelf_common::models::{RatingPatch, RatingPayload};
use rateshelf_common::time::today;
use rateshelf_common::validation::{is_valid_score, ValidationError};
use rateshelf_common::Rating;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::RatingsApi;
use crate::messages::{schedule_expiry, MessageKind, Messages};
use crate::picture::{self, ImageFile};
use crate::stats::{self, Stats};
use crate::view::{filter_and_sort, SortMode};
use crate::Confirm;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this rating?";

/// Editable fields of a rating
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingForm {
    pub name: String,
    /// Data URI, empty when no picture is attached
    pub picture: String,
    pub rating: f64,
    pub review: String,
}

impl RatingForm {
    fn from_rating(rating: &Rating) -> Self {
        Self {
            name: rating.name.clone(),
            picture: rating.picture.clone(),
            rating: rating.rating,
            review: rating.review.clone(),
        }
    }

    /// Checks run before any network call, first failure wins
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        if !is_valid_score(self.rating) {
            return Err(ValidationError::RatingOutOfRange);
        }
        if self.review.trim().is_empty() {
            return Err(ValidationError::ReviewRequired);
        }
        Ok(())
    }
}

/// One edit to the form
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Name(String),
    Picture(String),
    /// Raw text; applied only if it parses to a score in range
    Rating(String),
    Review(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingsState {
    pub collection_id: Option<String>,
    pub items: Vec<Rating>,
    pub form: RatingForm,
    /// Rating being edited; `None` means the form creates
    pub editing_id: Option<String>,
    /// Name of the file held by the image input
    pub image_file: Option<String>,
    pub busy: bool,
    pub messages: Messages,
    pub search: String,
    pub sort: SortMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatingsAction {
    /// Switch collection; `None` empties the list at once
    SetCollection(Option<String>),
    Busy(bool),
    ClearMessages,
    Notify(MessageKind, String),
    Expire(MessageKind, u64),
    /// Fetch result, ignored if the collection changed meanwhile
    Loaded {
        collection_id: String,
        items: Vec<Rating>,
    },
    LoadFailed {
        collection_id: String,
    },
    Edit(FormField),
    ImageAttached {
        file_name: String,
        data_uri: String,
    },
    StartEdit(Rating),
    CancelEdit,
    /// A save went through; back to an empty create form
    Saved,
    SetSearch(String),
    SetSort(SortMode),
}

impl RatingsState {
    pub fn apply(&mut self, action: RatingsAction) {
        match action {
            RatingsAction::SetCollection(id) => {
                if id.is_none() {
                    self.items.clear();
                }
                self.collection_id = id;
            }
            RatingsAction::Busy(busy) => self.busy = busy,
            RatingsAction::ClearMessages => self.messages.clear(),
            RatingsAction::Notify(kind, text) => {
                self.messages.show(kind, text);
            }
            RatingsAction::Expire(kind, generation) => self.messages.expire(kind, generation),
            RatingsAction::Loaded {
                collection_id,
                items,
            } => {
                if self.collection_id.as_deref() == Some(collection_id.as_str()) {
                    self.items = items;
                }
            }
            RatingsAction::LoadFailed { collection_id } => {
                if self.collection_id.as_deref() == Some(collection_id.as_str()) {
                    self.items.clear();
                }
            }
            RatingsAction::Edit(field) => {
                match field {
                    FormField::Name(name) => self.form.name = name,
                    FormField::Picture(picture) => self.form.picture = picture,
                    FormField::Rating(raw) => {
                        if let Ok(score) = raw.trim().parse::<f64>() {
                            if is_valid_score(score) {
                                self.form.rating = score;
                            }
                        }
                    }
                    FormField::Review(review) => self.form.review = review,
                }
                self.messages.clear();
            }
            RatingsAction::ImageAttached {
                file_name,
                data_uri,
            } => {
                self.form.picture = data_uri;
                self.image_file = Some(file_name);
                self.messages.clear();
            }
            RatingsAction::StartEdit(rating) => {
                self.form = RatingForm::from_rating(&rating);
                self.editing_id = Some(rating.id);
                self.messages.clear();
            }
            RatingsAction::CancelEdit => {
                self.reset_form();
                self.messages.clear();
            }
            RatingsAction::Saved => self.reset_form(),
            RatingsAction::SetSearch(search) => self.search = search,
            RatingsAction::SetSort(sort) => self.sort = sort,
        }
    }

    fn reset_form(&mut self) {
        self.form = RatingForm::default();
        self.editing_id = None;
        self.image_file = None;
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Items matching the search, in the active sort order
    pub fn view(&self) -> Vec<Rating> {
        filter_and_sort(&self.items, &self.search, self.sort)
    }

    /// Statistics over every loaded item, ignoring the search
    pub fn stats(&self) -> Stats {
        stats::compute(&self.items)
    }
}

/// Drives a [`RatingsState`] against a [`RatingsApi`]
pub struct RatingsStore<A> {
    api: A,
    state: Arc<Mutex<RatingsState>>,
}

impl<A: RatingsApi> RatingsStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(RatingsState::default())),
        }
    }

    pub async fn snapshot(&self) -> RatingsState {
        self.state.lock().await.clone()
    }

    async fn dispatch(&self, action: RatingsAction) {
        self.state.lock().await.apply(action);
    }

    async fn notify(&self, kind: MessageKind, text: &str) {
        let generation = {
            let mut state = self.state.lock().await;
            state.apply(RatingsAction::Notify(kind, text.to_string()));
            state.messages.generation(kind)
        };
        schedule_expiry(Arc::clone(&self.state), kind, move |state| {
            state.apply(RatingsAction::Expire(kind, generation))
        });
    }

    async fn collection_id(&self) -> Option<String> {
        self.state.lock().await.collection_id.clone()
    }

    /// Point the container at another collection and load it
    pub async fn set_collection(&self, collection_id: Option<&str>) {
        self.dispatch(RatingsAction::SetCollection(collection_id.map(str::to_string)))
            .await;
        self.fetch().await;
    }

    /// Reload the current collection, clearing messages first
    pub async fn fetch(&self) {
        if self.collection_id().await.is_none() {
            self.dispatch(RatingsAction::SetCollection(None)).await;
            return;
        }

        self.dispatch(RatingsAction::Busy(true)).await;
        self.dispatch(RatingsAction::ClearMessages).await;
        self.refresh().await;
        self.dispatch(RatingsAction::Busy(false)).await;
    }

    /// Reload without touching messages
    async fn refresh(&self) {
        let Some(collection_id) = self.collection_id().await else {
            return;
        };

        match self.api.list_ratings(&collection_id).await {
            Ok(items) => {
                debug!("Fetched {} ratings for {}", items.len(), collection_id);
                self.dispatch(RatingsAction::Loaded {
                    collection_id,
                    items,
                })
                .await;
            }
            Err(e) => {
                warn!("Failed to fetch ratings for {}: {}", collection_id, e);
                let current = self.collection_id().await.as_deref() == Some(collection_id.as_str());
                self.dispatch(RatingsAction::LoadFailed { collection_id })
                    .await;
                if current {
                    self.notify(MessageKind::Error, "Failed to fetch ratings from server")
                        .await;
                }
            }
        }
    }

    pub async fn edit_field(&self, field: FormField) {
        self.dispatch(RatingsAction::Edit(field)).await;
    }

    /// Attach an image to the form; returns whether it was accepted
    pub async fn ingest_image(&self, file: ImageFile) -> bool {
        if let Err(e) = picture::check(&file) {
            warn!("Rejected image {}: {}", file.name, e);
            self.notify(MessageKind::Error, &e.to_string()).await;
            return false;
        }

        let file_name = file.name.clone();
        let processed = tokio::task::spawn_blocking(move || picture::ingest(&file)).await;
        match processed {
            Ok(Ok(data_uri)) => {
                debug!("Image {} ingested ({} bytes as data URI)", file_name, data_uri.len());
                self.dispatch(RatingsAction::ImageAttached {
                    file_name,
                    data_uri,
                })
                .await;
                true
            }
            Ok(Err(e)) => {
                warn!("Image {} could not be processed: {:?}", file_name, e);
                self.notify(MessageKind::Error, &e.to_string()).await;
                false
            }
            Err(e) => {
                warn!("Image task failed: {}", e);
                self.notify(MessageKind::Error, "Failed to process image")
                    .await;
                false
            }
        }
    }

    /// Validate the form and create or update; returns whether it saved
    pub async fn submit(&self) -> bool {
        let (collection_id, form, editing_id) = {
            let state = self.state.lock().await;
            (
                state.collection_id.clone(),
                state.form.clone(),
                state.editing_id.clone(),
            )
        };

        let Some(collection_id) = collection_id else {
            self.notify(MessageKind::Error, "Please select a collection first")
                .await;
            return false;
        };
        if let Err(e) = form.validate() {
            self.notify(MessageKind::Error, &e.to_string()).await;
            return false;
        }

        self.dispatch(RatingsAction::Busy(true)).await;
        self.dispatch(RatingsAction::ClearMessages).await;

        let saved = match &editing_id {
            Some(id) => {
                let patch = RatingPatch {
                    name: Some(form.name.clone()),
                    picture: Some(form.picture.clone()),
                    rating: Some(json!(form.rating)),
                    review: Some(form.review.clone()),
                };
                self.api.update_rating(id, &patch).await
            }
            None => {
                let payload = RatingPayload {
                    name: Some(form.name.clone()),
                    picture: Some(form.picture.clone()),
                    rating: Some(json!(form.rating)),
                    review: Some(form.review.clone()),
                    created_at: Some(today()),
                    collection_id: Some(collection_id.clone()),
                };
                self.api.create_rating(&collection_id, &payload).await
            }
        };

        let verb = if editing_id.is_some() { "update" } else { "create" };
        let ok = match saved {
            Ok(rating) => {
                info!("Rating {} saved ({})", rating.id, verb);
                let text = if editing_id.is_some() {
                    "Rating updated successfully!"
                } else {
                    "Rating created successfully!"
                };
                self.notify(MessageKind::Success, text).await;
                self.refresh().await;
                self.dispatch(RatingsAction::Saved).await;
                true
            }
            Err(e) => {
                warn!("Failed to {} rating: {}", verb, e);
                self.notify(
                    MessageKind::Error,
                    &format!("Failed to {} rating. Please try again.", verb),
                )
                .await;
                false
            }
        };

        self.dispatch(RatingsAction::Busy(false)).await;
        ok
    }

    pub async fn start_edit(&self, rating: Rating) {
        self.dispatch(RatingsAction::StartEdit(rating)).await;
    }

    pub async fn cancel_edit(&self) {
        self.dispatch(RatingsAction::CancelEdit).await;
    }

    /// Delete a rating after confirmation
    pub async fn delete(&self, id: &str, confirm: &impl Confirm) {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("Delete of rating {} declined", id);
            return;
        }

        self.dispatch(RatingsAction::Busy(true)).await;
        match self.api.delete_rating(id).await {
            Ok(()) => {
                info!("Deleted rating {}", id);
                self.notify(MessageKind::Success, "Rating deleted successfully!")
                    .await;
                self.refresh().await;
            }
            Err(e) => {
                warn!("Failed to delete rating {}: {}", id, e);
                self.notify(
                    MessageKind::Error,
                    "Failed to delete rating. Please try again.",
                )
                .await;
            }
        }
        self.dispatch(RatingsAction::Busy(false)).await;
    }

    pub async fn set_search(&self, search: &str) {
        self.dispatch(RatingsAction::SetSearch(search.to_string()))
            .await;
    }

    pub async fn set_sort(&self, sort: SortMode) {
        self.dispatch(RatingsAction::SetSort(sort)).await;
    }

    pub async fn view(&self) -> Vec<Rating> {
        self.state.lock().await.view()
    }

    pub async fn stats(&self) -> Stats {
        self.state.lock().await.stats()
    }
}
