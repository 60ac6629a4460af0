//! The user override store.
//!
//! Overrides are sparse corrections to individual base rows: the amount, the
//! primary category, or both. They live in their own CSV file, keyed by the
//! same transaction id as the base store, and the whole file is rewritten on
//! every mutation.

use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
    sync::Mutex,
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::Category,
    transaction::{DATE_FORMAT, Transaction, TransactionId},
};

use super::TransactionStore;

/// A user correction to one base transaction.
///
/// `amount` and `category` are the only overridable fields. `None` means "no
/// override for that field": the base value shows through. An explicit
/// `Some(0.0)` amount is a real override, never "not provided".
///
/// The remaining fields are copied from the base row when the override is
/// created. They make the override file readable on its own but are never
/// merged back; the base store stays authoritative for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    /// The id of the base transaction being corrected.
    pub transaction_id: TransactionId,
    /// The corrected amount, if the amount was corrected.
    pub amount: Option<f64>,
    /// The corrected category, if the category was corrected.
    pub category: Option<Category>,
    /// The base row's date at creation time.
    pub date: Date,
    /// The base row's merchant name at creation time.
    pub merchant_name: String,
    /// The base row's statement description at creation time.
    pub name: String,
    /// The base row's account at creation time.
    pub account_id: String,
    /// The base row's detailed category at creation time.
    pub category_detailed: String,
}

impl Override {
    fn from_base(base: &Transaction) -> Self {
        Self {
            transaction_id: base.id.clone(),
            amount: None,
            category: None,
            date: base.date,
            merchant_name: base.merchant_name.clone(),
            name: base.name.clone(),
            account_id: base.account_id.clone(),
            category_detailed: base.category_detailed.clone(),
        }
    }
}

/// The fields to change in an [OverrideStore::upsert] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverrideUpdate {
    /// The new amount, or `None` to leave the amount alone.
    pub new_amount: Option<f64>,
    /// The new category, or `None` to leave the category alone.
    pub new_category: Option<Category>,
}

impl OverrideUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.new_amount.is_none() && self.new_category.is_none()
    }
}

/// The on-disk row layout of the override CSV file.
///
/// Empty `amount` and primary-category cells mean "field not overridden".
#[derive(Debug, Serialize, Deserialize)]
struct OverrideRow {
    transaction_id: String,
    date: String,
    amount: String,
    merchant_name: String,
    name: String,
    account_id: String,
    #[serde(rename = "personal_finance_category.primary")]
    category_primary: String,
    #[serde(rename = "personal_finance_category.detailed")]
    category_detailed: String,
}

impl OverrideRow {
    fn into_override(self) -> Result<Override, Error> {
        let date = Date::parse(&self.date, &DATE_FORMAT).map_err(|error| {
            Error::DataSource(format!(
                "could not parse date \"{}\" for override {}: {error}",
                self.date, self.transaction_id
            ))
        })?;

        let amount = if self.amount.is_empty() {
            None
        } else {
            Some(self.amount.parse::<f64>().map_err(|error| {
                Error::DataSource(format!(
                    "could not parse amount \"{}\" for override {}: {error}",
                    self.amount, self.transaction_id
                ))
            })?)
        };

        let category = if self.category_primary.is_empty() {
            None
        } else {
            Some(Category::from_label(&self.category_primary))
        };

        Ok(Override {
            transaction_id: TransactionId::new(self.transaction_id),
            amount,
            category,
            date,
            merchant_name: self.merchant_name,
            name: self.name,
            account_id: self.account_id,
            category_detailed: self.category_detailed,
        })
    }

    fn from_override(row: &Override) -> Result<Self, Error> {
        let date = row
            .date
            .format(&DATE_FORMAT)
            .map_err(|error| Error::DataSource(format!("could not format date: {error}")))?;

        Ok(Self {
            transaction_id: row.transaction_id.as_str().to_owned(),
            date,
            amount: row.amount.map(|amount| amount.to_string()).unwrap_or_default(),
            merchant_name: row.merchant_name.clone(),
            name: row.name.clone(),
            account_id: row.account_id.clone(),
            category_primary: row
                .category
                .map(|category| category.label().to_owned())
                .unwrap_or_default(),
            category_detailed: row.category_detailed.clone(),
        })
    }
}

/// The CSV-backed store of user overrides.
///
/// Mutations rewrite the whole file through a temporary file and an atomic
/// rename, so a concurrent reader never observes a partially-written table.
#[derive(Debug)]
pub struct OverrideStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OverrideStore {
    /// Create a store reading and writing the CSV file at `path`.
    ///
    /// The file does not have to exist yet; a missing file reads as an empty
    /// override table.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Every override currently on disk.
    pub fn read_all(&self) -> Result<Vec<Override>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(error) => {
                return Err(Error::DataSource(format!(
                    "could not open {}: {error}",
                    self.path.display()
                )));
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let mut overrides = Vec::new();
        for row in reader.deserialize::<OverrideRow>() {
            overrides.push(row?.into_override()?);
        }

        Ok(overrides)
    }

    /// Create or update the override for `id`.
    ///
    /// A new override starts as a copy of the base row's identifying fields,
    /// then the provided fields are applied. An existing override keeps its
    /// previously-overridden fields and only the provided fields change.
    ///
    /// # Errors
    /// - [Error::EmptyOverride] when `update` provides neither field.
    /// - [Error::NotFound] when `id` does not exist in the base store.
    pub fn upsert(
        &self,
        base: &dyn TransactionStore,
        id: &TransactionId,
        update: OverrideUpdate,
    ) -> Result<Override, Error> {
        if update.is_empty() {
            return Err(Error::EmptyOverride);
        }

        let _guard = self.write_lock.lock().map_err(|_| Error::StoreLock)?;

        let mut overrides = self.read_all()?;

        let index = match overrides
            .iter()
            .position(|row| row.transaction_id == *id)
        {
            Some(index) => index,
            None => {
                let base_row = base.get_by_id(id)?;
                overrides.push(Override::from_base(&base_row));
                overrides.len() - 1
            }
        };

        let row = &mut overrides[index];
        if let Some(amount) = update.new_amount {
            row.amount = Some(amount);
        }
        if let Some(category) = update.new_category {
            row.category = Some(category);
        }
        let updated = row.clone();

        self.write_all(&overrides)?;

        Ok(updated)
    }

    /// Remove the override for `id`.
    ///
    /// Removing an override that does not exist is a no-op, not an error. The
    /// merged view reverts to the base row's original values.
    pub fn delete(&self, id: &TransactionId) -> Result<(), Error> {
        let _guard = self.write_lock.lock().map_err(|_| Error::StoreLock)?;

        let mut overrides = self.read_all()?;
        let before = overrides.len();
        overrides.retain(|row| row.transaction_id != *id);

        if overrides.len() != before {
            self.write_all(&overrides)?;
        }

        Ok(())
    }

    /// When the override file last changed, or `None` when no override has
    /// been written yet.
    pub fn last_modified(&self) -> Result<Option<SystemTime>, Error> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(Error::DataSource(format!(
                    "could not stat {}: {error}",
                    self.path.display()
                )));
            }
        };

        metadata.modified().map(Some).map_err(|error| {
            Error::DataSource(format!(
                "could not read modification time of {}: {error}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, overrides: &[Override]) -> Result<(), Error> {
        let temp_path = self.path.with_extension("tmp");

        let mut writer = csv::Writer::from_path(&temp_path)?;
        for row in overrides {
            writer.serialize(OverrideRow::from_override(row)?)?;
        }
        writer.flush().map_err(|error| {
            Error::DataSource(format!("could not flush {}: {error}", temp_path.display()))
        })?;
        drop(writer);

        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
