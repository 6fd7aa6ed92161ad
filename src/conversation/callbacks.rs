use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::ledger::domain::{categories::CategoryKind, transactions::TransactionKind};

use super::confirm::ConfirmAction;

const TRANSACTION_TYPE: &str = "transaction_type_";
const CATEGORY_TYPE: &str = "category_type_";
const ACCOUNT: &str = "account_";
const CATEGORY: &str = "category_";
const TRANSFER_FROM: &str = "transfer_from_";
const TRANSFER_TO: &str = "transfer_to_";
const DECISION: &str = "confirm_";

/// The data carried by an inline button, decoded once when the press arrives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallbackToken {
    TransactionType(TransactionKind),
    CategoryType(CategoryKind),
    Account(i64),
    Category(i64),
    TransferFrom(i64),
    TransferTo(i64),
    Decision(ConfirmAction),
}

#[derive(Debug, Eq, PartialEq, Error)]
#[error("unrecognized callback data: {0:?}")]
pub struct TokenError(pub String);

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransactionType(kind) => write!(f, "{}{}", TRANSACTION_TYPE, kind),
            Self::CategoryType(kind) => write!(f, "{}{}", CATEGORY_TYPE, kind),
            Self::Account(id) => write!(f, "{}{}", ACCOUNT, id),
            Self::Category(id) => write!(f, "{}{}", CATEGORY, id),
            Self::TransferFrom(id) => write!(f, "{}{}", TRANSFER_FROM, id),
            Self::TransferTo(id) => write!(f, "{}{}", TRANSFER_TO, id),
            Self::Decision(action) => write!(f, "{}{}", DECISION, action),
        }
    }
}

impl FromStr for CallbackToken {
    type Err = TokenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || TokenError(raw.to_owned());
        let id = |suffix: &str| suffix.parse::<i64>().map_err(|_| invalid());

        // `category_type_` shares its start with `category_`, so it goes first.
        if let Some(kind) = raw.strip_prefix(TRANSACTION_TYPE) {
            kind.parse().map(Self::TransactionType).map_err(|_| invalid())
        } else if let Some(kind) = raw.strip_prefix(CATEGORY_TYPE) {
            kind.parse().map(Self::CategoryType).map_err(|_| invalid())
        } else if let Some(suffix) = raw.strip_prefix(ACCOUNT) {
            id(suffix).map(Self::Account)
        } else if let Some(suffix) = raw.strip_prefix(CATEGORY) {
            id(suffix).map(Self::Category)
        } else if let Some(suffix) = raw.strip_prefix(TRANSFER_FROM) {
            id(suffix).map(Self::TransferFrom)
        } else if let Some(suffix) = raw.strip_prefix(TRANSFER_TO) {
            id(suffix).map(Self::TransferTo)
        } else if let Some(action) = raw.strip_prefix(DECISION) {
            action.parse().map(Self::Decision).map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    }
}
