//! The flat-file implementation of the base transaction store.

use std::{fs::File, io::BufReader, path::PathBuf, time::SystemTime};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::Category,
    transaction::{DATE_FORMAT, Transaction, TransactionId},
};

/// The on-disk row layout of the base CSV file.
///
/// The nested category labels keep the column names the sync process writes,
/// e.g. `personal_finance_category.primary`.
#[derive(Debug, Serialize, Deserialize)]
struct BaseRow {
    transaction_id: String,
    date: String,
    amount: f64,
    merchant_name: String,
    name: String,
    account_id: String,
    #[serde(rename = "personal_finance_category.primary")]
    category_primary: String,
    #[serde(rename = "personal_finance_category.detailed")]
    category_detailed: String,
}

impl BaseRow {
    fn into_transaction(self) -> Result<Transaction, Error> {
        let date = Date::parse(&self.date, &DATE_FORMAT).map_err(|error| {
            Error::DataSource(format!(
                "could not parse date \"{}\" for transaction {}: {error}",
                self.date, self.transaction_id
            ))
        })?;

        Ok(Transaction {
            id: TransactionId::new(self.transaction_id),
            date,
            amount: self.amount,
            merchant_name: self.merchant_name,
            name: self.name,
            account_id: self.account_id,
            category: Category::from_label(&self.category_primary),
            category_detailed: self.category_detailed,
        })
    }

    fn from_transaction(transaction: &Transaction) -> Result<Self, Error> {
        let date = transaction
            .date
            .format(&DATE_FORMAT)
            .map_err(|error| Error::DataSource(format!("could not format date: {error}")))?;

        Ok(Self {
            transaction_id: transaction.id.as_str().to_owned(),
            date,
            amount: transaction.amount,
            merchant_name: transaction.merchant_name.clone(),
            name: transaction.name.clone(),
            account_id: transaction.account_id.clone(),
            category_primary: transaction.category.label().to_owned(),
            category_detailed: transaction.category_detailed.clone(),
        })
    }
}

/// A base transaction store backed by a flat CSV file.
#[derive(Debug, Clone)]
pub struct CsvTransactionStore {
    path: PathBuf,
}

impl CsvTransactionStore {
    /// Create a store reading from the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Replace the entire file with `transactions`.
    ///
    /// The new contents are written to a temporary file in the same directory
    /// and swapped in with a rename, so readers never observe a partial file.
    pub fn replace_all(&self, transactions: &[Transaction]) -> Result<(), Error> {
        let temp_path = self.path.with_extension("tmp");

        let mut writer = csv::Writer::from_path(&temp_path)?;
        for transaction in transactions {
            writer.serialize(BaseRow::from_transaction(transaction)?)?;
        }
        writer.flush().map_err(|error| {
            Error::DataSource(format!("could not flush {}: {error}", temp_path.display()))
        })?;
        drop(writer);

        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl super::TransactionStore for CsvTransactionStore {
    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        let file = File::open(&self.path).map_err(|error| {
            Error::DataSource(format!("could not open {}: {error}", self.path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for row in reader.deserialize::<BaseRow>() {
            transactions.push(row?.into_transaction()?);
        }

        Ok(transactions)
    }

    fn get_by_id(&self, id: &TransactionId) -> Result<Transaction, Error> {
        self.get_all()?
            .into_iter()
            .find(|transaction| transaction.id == *id)
            .ok_or(Error::NotFound)
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
    use std::fs;

    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        store::TransactionStore,
        transaction::{Transaction, TransactionId},
    };

    use super::CsvTransactionStore;

    const HEADER: &str = "transaction_id,date,amount,merchant_name,name,account_id,\
        personal_finance_category.primary,personal_finance_category.detailed";

    fn write_base_file(contents: &str) -> (tempfile::TempDir, CsvTransactionStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        fs::write(&path, contents).unwrap();

        let store = CsvTransactionStore::new(&path);
        (dir, store)
    }

    #[test]
    fn reads_all_rows() {
        let contents = format!(
            "{HEADER}\n\
            t1,2025-07-01,42.50,Aldi,ALDI 123,acc-jay-01,GENERAL_MERCHANDISE,GENERAL_MERCHANDISE_SUPERSTORES\n\
            t2,2025-07-02,-100.00,Payroll,ACME PAYROLL,acc-jay-01,TRANSFER_OUT,TRANSFER_OUT_OTHER\n"
        );
        let (_dir, store) = write_base_file(&contents);

        let transactions = store.get_all().unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].id.as_str(), "t1");
        assert_eq!(transactions[0].amount, 42.5);
        assert_eq!(transactions[0].date, date!(2025 - 07 - 01));
        assert_eq!(transactions[0].category, Category::GeneralMerchandise);
        assert_eq!(transactions[1].amount, -100.0);
    }

    #[test]
    fn unknown_category_label_reads_as_other() {
        let contents = format!(
            "{HEADER}\n\
            t1,2025-07-01,10.00,Somewhere,SOMEWHERE,acc-jay-01,BRAND_NEW_LABEL,BRAND_NEW_LABEL_DETAIL\n"
        );
        let (_dir, store) = write_base_file(&contents);

        let transactions = store.get_all().unwrap();

        assert_eq!(transactions[0].category, Category::Other);
    }

    #[test]
    fn malformed_date_is_a_data_source_error() {
        let contents = format!(
            "{HEADER}\n\
            t1,yesterday,10.00,Somewhere,SOMEWHERE,acc-jay-01,FOOD_AND_DRINK,FOOD_AND_DRINK_FAST_FOOD\n"
        );
        let (_dir, store) = write_base_file(&contents);

        let result = store.get_all();

        assert!(matches!(result, Err(Error::DataSource(_))));
    }

    #[test]
    fn get_by_id_finds_a_row() {
        let contents = format!(
            "{HEADER}\n\
            t1,2025-07-01,42.50,Aldi,ALDI 123,acc-jay-01,GENERAL_MERCHANDISE,GENERAL_MERCHANDISE_SUPERSTORES\n"
        );
        let (_dir, store) = write_base_file(&contents);

        let transaction = store.get_by_id(&TransactionId::new("t1")).unwrap();
        assert_eq!(transaction.merchant_name, "Aldi");

        let missing = store.get_by_id(&TransactionId::new("t9"));
        assert_eq!(missing, Err(Error::NotFound));
    }

    #[test]
    fn replace_all_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        let store = CsvTransactionStore::new(&path);

        let transactions = vec![
            Transaction::build("t1", 42.5, date!(2025 - 07 - 01))
                .merchant_name("Aldi")
                .name("ALDI 123")
                .account_id("acc-jay-01")
                .category(Category::GeneralMerchandise)
                .category_detailed("GENERAL_MERCHANDISE_SUPERSTORES")
                .finish(),
        ];
        store.replace_all(&transactions).unwrap();

        let read_back = store.get_all().unwrap();
        assert_eq!(read_back, transactions);
        assert!(store.last_modified().is_ok());
    }
}
