//! The core transaction model.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::category::Category;

/// The date format used by the transaction feed and the override file.
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// The opaque identifier assigned to a transaction by the sync process.
///
/// Stable across syncs and unique within the base store, so it is used as the
/// primary key for overrides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap a raw identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single bank or credit-card transaction.
///
/// Positive amounts are money going out (purchases), negative or zero amounts
/// are inflows or refunds, following the convention of the source feed.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The identifier assigned by the sync process.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money that moved. Positive is money out.
    pub amount: f64,
    /// The cleaned-up merchant name from the feed.
    pub merchant_name: String,
    /// The raw statement description.
    pub name: String,
    /// The account the transaction belongs to.
    pub account_id: String,
    /// The primary spending category.
    pub category: Category,
    /// The detailed category label from the feed, kept as-is.
    pub category_detailed: String,
}

impl Transaction {
    /// Start building a transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(id: impl Into<String>, amount: f64, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            id: TransactionId::new(id),
            amount,
            date,
            merchant_name: String::new(),
            name: String::new(),
            account_id: String::new(),
            category: Category::Other,
            category_detailed: String::new(),
        }
    }
}

/// A builder for [Transaction] instances.
///
/// Required fields are the id, amount and date; everything else defaults to
/// empty strings and [Category::Other].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    id: TransactionId,
    amount: f64,
    date: Date,
    merchant_name: String,
    name: String,
    account_id: String,
    category: Category,
    category_detailed: String,
}

impl TransactionBuilder {
    /// Set the merchant name.
    pub fn merchant_name(mut self, merchant_name: &str) -> Self {
        self.merchant_name = merchant_name.to_owned();
        self
    }

    /// Set the raw statement description.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    /// Set the account the transaction belongs to.
    pub fn account_id(mut self, account_id: &str) -> Self {
        self.account_id = account_id.to_owned();
        self
    }

    /// Set the primary category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the detailed category label.
    pub fn category_detailed(mut self, category_detailed: &str) -> Self {
        self.category_detailed = category_detailed.to_owned();
        self
    }

    /// Finish building the transaction.
    pub fn finish(self) -> Transaction {
        Transaction {
            id: self.id,
            date: self.date,
            amount: self.amount,
            merchant_name: self.merchant_name,
            name: self.name,
            account_id: self.account_id,
            category: self.category,
            category_detailed: self.category_detailed,
        }
    }
}
