use std::convert::TryFrom;

use chrono::{DateTime, Utc};

use crate::ledger::domain;

/// A category row.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub emoji: String,
    pub comment: String,
}

/// An account row.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub current_balance: String,
    pub comment: String,
}

/// A row of the `ledger_transaction` table.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,
    pub kind: String,
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

impl TryFrom<Category> for domain::categories::Category {
    type Error = anyhow::Error;

    fn try_from(model: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            kind: model.kind.parse()?,
            emoji: model.emoji,
            comment: model.comment,
        })
    }
}

impl From<Account> for domain::accounts::Account {
    fn from(model: Account) -> Self {
        Self {
            id: model.id,
            name: model.name,
            currency: model.currency,
            current_balance: model.current_balance,
            comment: model.comment,
        }
    }
}

impl TryFrom<Transaction> for domain::transactions::TransactionRecord {
    type Error = anyhow::Error;

    fn try_from(model: Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: model.kind.parse()?,
            amount: model.amount,
            category_name: model.category_name,
            comment: model.comment,
            user_id: model.user_id,
            display_name: model.display_name,
            account_name: model.account_name,
            account_id: model.account_id,
            balance_before: model.balance_before,
            balance_after: model.balance_after,
            created_at: model.created_at,
        })
    }
}
