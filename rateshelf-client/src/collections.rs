//! Collections state container
//!
//! [`CollectionsState`] is a plain struct changed only through
//! [`CollectionsState::apply`]. [`CollectionsStore`] drives it: it talks to
//! the API, dispatches actions and schedules message expiry.

use rateshelf_common::models::{CreateCollectionRequest, UpdateCollectionRequest};
use rateshelf_common::Collection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ClientError, CollectionsApi};
use crate::messages::{schedule_expiry, MessageKind, Messages};
use crate::Confirm;

pub const DELETE_PROMPT: &str = "Are you sure? This will delete all ratings in this collection.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionsState {
    pub collections: Vec<Collection>,
    pub selected: Option<Collection>,
    pub busy: bool,
    pub messages: Messages,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionsAction {
    Busy(bool),
    ClearMessages,
    Notify(MessageKind, String),
    Expire(MessageKind, u64),
    /// A fresh list arrived; the selection follows it
    Loaded(Vec<Collection>),
    LoadFailed,
    /// Select by id from the current list; `None` or an unknown id deselects
    Select(Option<String>),
    SelectFirstIfNone,
    /// Drop the selection if it is the given collection
    Forget(String),
}

impl CollectionsState {
    pub fn apply(&mut self, action: CollectionsAction) {
        match action {
            CollectionsAction::Busy(busy) => self.busy = busy,
            CollectionsAction::ClearMessages => self.messages.clear(),
            CollectionsAction::Notify(kind, text) => {
                self.messages.show(kind, text);
            }
            CollectionsAction::Expire(kind, generation) => self.messages.expire(kind, generation),
            CollectionsAction::Loaded(collections) => {
                self.selected = self
                    .selected
                    .as_ref()
                    .and_then(|current| collections.iter().find(|c| c.id == current.id))
                    .cloned();
                self.collections = collections;
            }
            CollectionsAction::LoadFailed => self.collections.clear(),
            CollectionsAction::Select(id) => {
                self.selected = id.and_then(|id| {
                    self.collections.iter().find(|c| c.id == id).cloned()
                });
            }
            CollectionsAction::SelectFirstIfNone => {
                if self.selected.is_none() {
                    self.selected = self.collections.first().cloned();
                }
            }
            CollectionsAction::Forget(id) => {
                if self.selected.as_ref().is_some_and(|c| c.id == id) {
                    self.selected = None;
                }
            }
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|c| c.id.as_str())
    }
}

/// Drives a [`CollectionsState`] against a [`CollectionsApi`]
pub struct CollectionsStore<A> {
    api: A,
    state: Arc<Mutex<CollectionsState>>,
}

impl<A: CollectionsApi> CollectionsStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(CollectionsState::default())),
        }
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> CollectionsState {
        self.state.lock().await.clone()
    }

    pub async fn selected(&self) -> Option<Collection> {
        self.state.lock().await.selected.clone()
    }

    async fn dispatch(&self, action: CollectionsAction) {
        self.state.lock().await.apply(action);
    }

    async fn notify(&self, kind: MessageKind, text: &str) {
        let generation = {
            let mut state = self.state.lock().await;
            state.apply(CollectionsAction::Notify(kind, text.to_string()));
            state.messages.generation(kind)
        };
        schedule_expiry(Arc::clone(&self.state), kind, move |state| {
            state.apply(CollectionsAction::Expire(kind, generation))
        });
    }

    async fn fail(&self, err: &ClientError, fallback: &str) {
        warn!("{}: {}", fallback, err);
        self.notify(MessageKind::Error, err.server_message().unwrap_or(fallback))
            .await;
    }

    /// First load: fetch everything and select the first collection
    pub async fn init(&self) {
        self.fetch_all().await;
        self.dispatch(CollectionsAction::SelectFirstIfNone).await;
    }

    /// Reload the list, clearing any visible messages first
    pub async fn fetch_all(&self) {
        self.dispatch(CollectionsAction::Busy(true)).await;
        self.dispatch(CollectionsAction::ClearMessages).await;
        self.refresh().await;
        self.dispatch(CollectionsAction::Busy(false)).await;
    }

    /// Reload the list without touching messages
    async fn refresh(&self) {
        match self.api.list_collections().await {
            Ok(collections) => {
                debug!("Fetched {} collections", collections.len());
                self.dispatch(CollectionsAction::Loaded(collections)).await;
            }
            Err(e) => {
                warn!("Failed to fetch collections: {}", e);
                self.dispatch(CollectionsAction::LoadFailed).await;
                self.notify(MessageKind::Error, "Failed to fetch collections from server")
                    .await;
            }
        }
    }

    pub async fn select(&self, id: Option<&str>) {
        self.dispatch(CollectionsAction::Select(id.map(str::to_string)))
            .await;
    }

    /// Create a collection; the error is also handed back to the caller
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Collection, ClientError> {
        self.dispatch(CollectionsAction::Busy(true)).await;
        self.dispatch(CollectionsAction::ClearMessages).await;

        let request = CreateCollectionRequest {
            name: Some(name.to_string()),
            description: description.map(str::to_string),
        };
        let result = self.api.create_collection(&request).await;
        match &result {
            Ok(collection) => {
                info!("Created collection {} ({})", collection.name, collection.id);
                self.notify(MessageKind::Success, "Collection created successfully!")
                    .await;
                self.refresh().await;
            }
            Err(e) => self.fail(e, "Failed to create collection").await,
        }

        self.dispatch(CollectionsAction::Busy(false)).await;
        result
    }

    pub async fn update(&self, id: &str, name: Option<&str>, description: Option<&str>) {
        self.dispatch(CollectionsAction::Busy(true)).await;
        self.dispatch(CollectionsAction::ClearMessages).await;

        let request = UpdateCollectionRequest {
            name: name.map(str::to_string),
            description: description.map(str::to_string),
        };
        match self.api.update_collection(id, &request).await {
            Ok(_) => {
                info!("Updated collection {}", id);
                self.notify(MessageKind::Success, "Collection updated successfully!")
                    .await;
                self.refresh().await;
            }
            Err(e) => self.fail(&e, "Failed to update collection").await,
        }

        self.dispatch(CollectionsAction::Busy(false)).await;
    }

    /// Delete a collection and, server-side, all its ratings
    ///
    /// Does nothing unless `confirm` agrees.
    pub async fn delete(&self, id: &str, confirm: &impl Confirm) {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("Delete of collection {} declined", id);
            return;
        }

        self.dispatch(CollectionsAction::Busy(true)).await;
        self.dispatch(CollectionsAction::ClearMessages).await;

        match self.api.delete_collection(id).await {
            Ok(()) => {
                info!("Deleted collection {}", id);
                self.notify(MessageKind::Success, "Collection deleted successfully!")
                    .await;
                self.dispatch(CollectionsAction::Forget(id.to_string())).await;
                self.refresh().await;
            }
            Err(e) => self.fail(&e, "Failed to delete collection").await,
        }

        self.dispatch(CollectionsAction::Busy(false)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn collection(id: &str, name: &str, count: i64) -> Collection {
        Collection {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_at: Utc::now(),
            rating_count: count,
        }
    }

    #[test]
    fn test_loaded_refreshes_selected_counts() {
        let mut state = CollectionsState::default();
        state.apply(CollectionsAction::Loaded(vec![collection("a", "Movies", 0)]));
        state.apply(CollectionsAction::SelectFirstIfNone);
        assert_eq!(state.selected_id(), Some("a"));

        state.apply(CollectionsAction::Loaded(vec![
            collection("b", "Books", 0),
            collection("a", "Movies", 3),
        ]));
        assert_eq!(state.selected.as_ref().map(|c| c.rating_count), Some(3));
    }

    #[test]
    fn test_loaded_drops_vanished_selection() {
        let mut state = CollectionsState::default();
        state.apply(CollectionsAction::Loaded(vec![collection("a", "Movies", 0)]));
        state.apply(CollectionsAction::Select(Some("a".to_string())));
        state.apply(CollectionsAction::Loaded(vec![collection("b", "Books", 0)]));
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_select_first_keeps_existing_choice() {
        let mut state = CollectionsState::default();
        state.apply(CollectionsAction::Loaded(vec![
            collection("a", "Movies", 0),
            collection("b", "Books", 0),
        ]));
        state.apply(CollectionsAction::Select(Some("b".to_string())));
        state.apply(CollectionsAction::SelectFirstIfNone);
        assert_eq!(state.selected_id(), Some("b"));

        state.apply(CollectionsAction::Select(Some("missing".to_string())));
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_forget_only_matching_selection() {
        let mut state = CollectionsState::default();
        state.apply(CollectionsAction::Loaded(vec![collection("a", "Movies", 0)]));
        state.apply(CollectionsAction::SelectFirstIfNone);

        state.apply(CollectionsAction::Forget("other".to_string()));
        assert_eq!(state.selected_id(), Some("a"));
        state.apply(CollectionsAction::Forget("a".to_string()));
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_load_failure_empties_list() {
        let mut state = CollectionsState::default();
        state.apply(CollectionsAction::Loaded(vec![collection("a", "Movies", 0)]));
        state.apply(CollectionsAction::LoadFailed);
        assert!(state.collections.is_empty());
    }
}
