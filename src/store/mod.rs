//! Row stores for the base transaction table and the user override table.
//!
//! The base table is produced by an external sync process and is read-only
//! here; the override table is the only thing this application writes.

use std::time::SystemTime;

use crate::{
    Error,
    transaction::{Transaction, TransactionId},
};

mod csv;
mod overrides;
mod sqlite;

pub use csv::CsvTransactionStore;
pub use overrides::{Override, OverrideStore, OverrideUpdate};
pub use sqlite::SqliteTransactionStore;

/// Read access to the base transaction table.
///
/// The backing medium is abstracted away: the same interface is implemented
/// over a flat CSV file and over the sync process's SQLite database.
pub trait TransactionStore: Send + Sync {
    /// Every transaction in the store.
    fn get_all(&self) -> Result<Vec<Transaction>, Error>;

    /// The transaction with the given id.
    ///
    /// # Errors
    /// Returns [Error::NotFound] when no transaction has that id.
    fn get_by_id(&self, id: &TransactionId) -> Result<Transaction, Error>;

    /// When the backing data last changed.
    ///
    /// Used as the freshness signal for the merged-view cache: callers only
    /// re-read the store when this value advances.
    fn last_modified(&self) -> Result<SystemTime, Error>;
}
