//! Editing a transaction: the form page and the override endpoints.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;

use crate::{
    AppState,
    merge::DatasetCache,
    store::{OverrideStore, TransactionStore},
};

mod endpoint;
mod page;

pub(crate) use endpoint::{reset_override_endpoint, save_override_endpoint};
pub(crate) use page::get_edit_transaction_page;

/// The state needed to show the edit form and mutate overrides.
#[derive(Clone)]
pub struct EditState {
    /// The read-only base transaction store.
    pub base_store: Arc<dyn TransactionStore>,
    /// The store of the user's manual corrections.
    pub override_store: Arc<OverrideStore>,
    /// The cached merged view shared by every request.
    pub dataset: Arc<Mutex<DatasetCache>>,
}

impl FromRef<AppState> for EditState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            base_store: state.base_store.clone(),
            override_store: state.override_store.clone(),
            dataset: state.dataset.clone(),
        }
    }
}

impl EditState {
    /// Force the next dashboard read to re-merge.
    ///
    /// Called after every mutation so an edit is visible immediately even
    /// when the file modification time has not ticked over.
    fn invalidate_dataset(&self) {
        match self.dataset.lock() {
            Ok(mut dataset) => dataset.invalidate(),
            Err(error) => tracing::error!("Could not lock the dataset cache: {error}"),
        }
    }
}
