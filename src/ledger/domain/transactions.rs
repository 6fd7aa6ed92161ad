use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::categories::CategoryKind;

/// Category label attached to the outgoing half of a transfer.
pub const TRANSFER_DEBIT: &str = "Transfer debit";

/// Category label attached to the incoming half of a transfer.
pub const TRANSFER_CREDIT: &str = "Transfer credit";

/// Whether a transaction adds money to an account or takes it away.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Eq, PartialEq, Error)]
#[error("unknown transaction kind: {0:?}")]
pub struct UnknownTransactionKind(pub String);

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Apply an amount of this kind to a balance.
    pub fn apply(&self, balance: f64, amount: f64) -> f64 {
        match self {
            Self::Income => balance + amount,
            Self::Expense => balance - amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(UnknownTransactionKind(other.to_owned())),
        }
    }
}

impl From<TransactionKind> for CategoryKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => CategoryKind::Income,
            TransactionKind::Expense => CategoryKind::Expense,
        }
    }
}

/// The person a transaction is attributed to.
#[derive(Clone, Debug, PartialEq)]
pub struct Author {
    pub user_id: i64,
    pub display_name: String,
}

/// A transaction row that is about to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_name: String,
    pub comment: String,
    pub author: Author,
    pub account_name: String,
    pub account_id: i64,
    pub balance_before: String,
    pub balance_after: String,
}

/// A transaction row as read back from storage.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRecord {
    pub id: i64,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_name: String,
    pub comment: String,
    pub user_id: i64,
    pub display_name: String,
    pub account_name: String,
    pub account_id: i64,
    pub balance_before: String,
    pub balance_after: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Transfer halves are bookkeeping, not income or spending.
    pub fn is_transfer(&self) -> bool {
        self.category_name == TRANSFER_DEBIT || self.category_name == TRANSFER_CREDIT
    }
}
