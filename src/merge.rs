//! The transaction merge engine.
//!
//! Combines the base table with the user override table into the single
//! merged view the rest of the application reads. Merging is a pure function
//! of its inputs; [DatasetCache] adds the freshness-checked caching layer on
//! top so the stores are only re-read when their files actually change.

use std::{collections::HashMap, time::SystemTime};

use crate::{
    Error,
    store::{Override, OverrideStore, TransactionStore},
    transaction::{Transaction, TransactionId},
};

/// Apply the overrides to the base table.
///
/// The result has the same row count, identifier set and order as `base`. For
/// every row with an override, each overridden field replaces the base value;
/// everything else, including all non-overridable fields, comes from base.
/// Overrides whose id no longer exists in base are ignored.
pub fn merge_overrides(base: &[Transaction], overrides: &[Override]) -> Vec<Transaction> {
    let by_id: HashMap<&TransactionId, &Override> = overrides
        .iter()
        .map(|row| (&row.transaction_id, row))
        .collect();

    base.iter()
        .map(|row| match by_id.get(&row.id) {
            None => row.clone(),
            Some(correction) => {
                let mut merged = row.clone();
                if let Some(amount) = correction.amount {
                    merged.amount = amount;
                }
                if let Some(category) = correction.category {
                    merged.category = category;
                }
                merged
            }
        })
        .collect()
}

/// The cached merged view plus the freshness signals it was built from.
///
/// One instance is shared across the dashboard's request handlers. Each
/// request calls [DatasetCache::refresh] first; the stores are only re-read
/// when a file modification time has moved since the last merge. After a
/// mutation, [DatasetCache::invalidate] forces the next refresh regardless of
/// modification times, since those can have coarser granularity than two
/// edits in quick succession.
#[derive(Debug, Default)]
pub struct DatasetCache {
    rows: Vec<Transaction>,
    base_modified: Option<SystemTime>,
    overrides_modified: Option<SystemTime>,
}

impl DatasetCache {
    /// An empty cache. The first [DatasetCache::refresh] always merges.
    pub fn new() -> Self {
        Self::default()
    }

    /// The merged view as of the last successful refresh.
    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    /// When the base store last changed, as of the last refresh.
    ///
    /// Drives the "last updated" label in the dashboard header.
    pub fn base_modified(&self) -> Option<SystemTime> {
        self.base_modified
    }

    /// Re-merge if either store changed since the last refresh.
    ///
    /// Returns whether a merge happened. On an error the previously cached
    /// rows are left in place so callers can fall back to the last-known-good
    /// view for reads.
    pub fn refresh(
        &mut self,
        base: &dyn TransactionStore,
        overrides: &OverrideStore,
    ) -> Result<bool, Error> {
        let base_modified = base.last_modified()?;
        let overrides_modified = overrides.last_modified()?;

        if self.base_modified == Some(base_modified)
            && self.overrides_modified == overrides_modified
        {
            return Ok(false);
        }

        let base_rows = base.get_all()?;
        let override_rows = overrides.read_all()?;

        self.rows = merge_overrides(&base_rows, &override_rows);
        self.base_modified = Some(base_modified);
        self.overrides_modified = overrides_modified;

        Ok(true)
    }

    /// Force the next [DatasetCache::refresh] to merge again.
    pub fn invalidate(&mut self) {
        self.base_modified = None;
    }
}
