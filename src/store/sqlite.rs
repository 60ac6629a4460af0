//! The plaid-sync implementation of the base transaction store.
//!
//! The sync process writes one JSON document per transaction into a SQLite
//! table. This store decodes those documents into [Transaction] rows and uses
//! `json_extract` for point lookups, leaving the database itself untouched.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::SystemTime,
};

use rusqlite::Connection;
use serde_json::Value;
use time::Date;

use crate::{
    Error,
    category::Category,
    transaction::{DATE_FORMAT, Transaction, TransactionId},
};

/// A base transaction store backed by the sync process's SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteTransactionStore {
    /// Open the database at `path`.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the database cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let connection = Connection::open(&path)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            path,
        })
    }
}

fn string_field(document: &Value, field: &str) -> String {
    document[field].as_str().unwrap_or_default().to_owned()
}

/// Decode one `plaid_json` document into a [Transaction].
fn parse_document(json: &str) -> Result<Transaction, Error> {
    let document: Value = serde_json::from_str(json)?;

    let id = document["transaction_id"].as_str().ok_or_else(|| {
        Error::DataSource("transaction document is missing transaction_id".to_owned())
    })?;

    let amount = document["amount"].as_f64().ok_or_else(|| {
        Error::DataSource(format!("transaction {id} has a non-numeric amount"))
    })?;

    let date_string = document["date"]
        .as_str()
        .ok_or_else(|| Error::DataSource(format!("transaction {id} is missing its date")))?;
    let date = Date::parse(date_string, &DATE_FORMAT).map_err(|error| {
        Error::DataSource(format!(
            "could not parse date \"{date_string}\" for transaction {id}: {error}"
        ))
    })?;

    let category_primary = document["personal_finance_category"]["primary"]
        .as_str()
        .unwrap_or_default();
    let category_detailed = document["personal_finance_category"]["detailed"]
        .as_str()
        .unwrap_or_default();

    Ok(Transaction {
        id: TransactionId::new(id),
        date,
        amount,
        merchant_name: string_field(&document, "merchant_name"),
        name: string_field(&document, "name"),
        account_id: string_field(&document, "account_id"),
        category: Category::from_label(category_primary),
        category_detailed: category_detailed.to_owned(),
    })
}

impl super::TransactionStore for SqliteTransactionStore {
    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        let connection = self.connection.lock().map_err(|_| Error::StoreLock)?;

        let documents = connection
            .prepare("SELECT plaid_json FROM transactions")?
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()?;

        documents
            .iter()
            .map(|document| parse_document(document))
            .collect()
    }

    fn get_by_id(&self, id: &TransactionId) -> Result<Transaction, Error> {
        let connection = self.connection.lock().map_err(|_| Error::StoreLock)?;

        let document: String = connection
            .prepare(
                "SELECT plaid_json FROM transactions
                 WHERE json_extract(plaid_json, '$.transaction_id') = ?1",
            )?
            .query_row([id.as_str()], |row| row.get(0))?;

        parse_document(&document)
    }

    fn last_modified(&self) -> Result<SystemTime, Error> {
        let metadata = std::fs::metadata(&self.path).map_err(|error| {
            Error::DataSource(format!("could not stat {}: {error}", self.path.display()))
        })?;

        metadata.modified().map_err(|error| {
            Error::DataSource(format!(
                "could not read modification time of {}: {error}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        store::TransactionStore,
        transaction::TransactionId,
    };

    use super::SqliteTransactionStore;

    fn seed_database(path: &std::path::Path, documents: &[&str]) {
        let connection = Connection::open(path).unwrap();
        connection
            .execute("CREATE TABLE transactions (plaid_json TEXT NOT NULL)", ())
            .unwrap();

        for document in documents {
            connection
                .execute("INSERT INTO transactions (plaid_json) VALUES (?1)", [document])
                .unwrap();
        }
    }

    fn sample_document(id: &str, amount: f64) -> String {
        format!(
            r#"{{
                "transaction_id": "{id}",
                "date": "2025-07-01",
                "amount": {amount},
                "merchant_name": "Aldi",
                "name": "ALDI 123",
                "account_id": "acc-jay-01",
                "personal_finance_category": {{
                    "primary": "GENERAL_MERCHANDISE",
                    "detailed": "GENERAL_MERCHANDISE_SUPERSTORES"
                }}
            }}"#
        )
    }

    #[test]
    fn reads_all_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaid-sync.db");
        seed_database(
            &path,
            &[&sample_document("t1", 42.5), &sample_document("t2", -10.0)],
        );

        let store = SqliteTransactionStore::open(&path).unwrap();
        let transactions = store.get_all().unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].id.as_str(), "t1");
        assert_eq!(transactions[0].date, date!(2025 - 07 - 01));
        assert_eq!(transactions[0].category, Category::GeneralMerchandise);
        assert_eq!(transactions[1].amount, -10.0);
    }

    #[test]
    fn get_by_id_uses_the_document_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaid-sync.db");
        seed_database(
            &path,
            &[&sample_document("t1", 42.5), &sample_document("t2", 7.0)],
        );

        let store = SqliteTransactionStore::open(&path).unwrap();

        let transaction = store.get_by_id(&TransactionId::new("t2")).unwrap();
        assert_eq!(transaction.amount, 7.0);

        let missing = store.get_by_id(&TransactionId::new("t9"));
        assert_eq!(missing, Err(Error::NotFound));
    }

    #[test]
    fn document_without_category_reads_as_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaid-sync.db");
        seed_database(
            &path,
            &[r#"{"transaction_id": "t1", "date": "2025-07-01", "amount": 5.0}"#],
        );

        let store = SqliteTransactionStore::open(&path).unwrap();
        let transactions = store.get_all().unwrap();

        assert_eq!(transactions[0].category, Category::Other);
        assert!(transactions[0].merchant_name.is_empty());
    }

    #[test]
    fn malformed_document_is_a_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaid-sync.db");
        seed_database(&path, &[r#"{"date": "2025-07-01", "amount": 5.0}"#]);

        let store = SqliteTransactionStore::open(&path).unwrap();

        assert!(matches!(store.get_all(), Err(Error::DataSource(_))));
    }

    #[test]
    fn last_modified_reflects_the_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaid-sync.db");
        seed_database(&path, &[&sample_document("t1", 1.0)]);

        let store = SqliteTransactionStore::open(&path).unwrap();

        assert!(store.last_modified().is_ok());
    }
}
