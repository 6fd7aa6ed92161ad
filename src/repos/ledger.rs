use std::{convert::TryFrom, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;

use crate::{
    database::PostgresConnection,
    ledger::domain::{
        accounts::{Account, NewAccount},
        categories::{Category, CategoryKind, NewCategory},
        transactions::{NewTransaction, TransactionRecord},
    },
    models,
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("category {name:?} of kind {kind} already exists")]
    DuplicateCategory { name: String, kind: CategoryKind },

    #[error("account {0:?} already exists")]
    DuplicateAccount(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DynLedgerRepo = Arc<dyn LedgerRepo + Send + Sync>;

/// Tabular storage for categories, accounts and transaction rows.
///
/// None of the operations are retried. Writes are independent of each other,
/// so a caller performing several writes has to deal with partial failure
/// itself.
#[async_trait]
pub trait LedgerRepo {
    async fn categories_by_kind(&self, kind: CategoryKind) -> anyhow::Result<Vec<Category>>;

    async fn category_by_id(&self, id: i64) -> anyhow::Result<Option<Category>>;

    async fn category_exists(&self, name: &str, kind: CategoryKind) -> anyhow::Result<bool>;

    /// Persist a new category.
    ///
    /// # Returns
    ///
    /// The stored category, or [`PersistenceError::DuplicateCategory`] if the
    /// name and kind pair is taken.
    async fn add_category(&self, category: &NewCategory) -> Result<Category, PersistenceError>;

    async fn all_accounts(&self) -> anyhow::Result<Vec<Account>>;

    async fn account_by_id(&self, id: i64) -> anyhow::Result<Option<Account>>;

    async fn account_exists(&self, name: &str) -> anyhow::Result<bool>;

    /// Persist a new account.
    ///
    /// # Returns
    ///
    /// The stored account, or [`PersistenceError::DuplicateAccount`] if the
    /// name is taken.
    async fn add_account(&self, account: &NewAccount) -> Result<Account, PersistenceError>;

    /// Overwrite the balance of an account.
    ///
    /// # Returns
    ///
    /// `false` if no account with the given ID exists.
    async fn update_account_balance(&self, id: i64, balance: &str) -> anyhow::Result<bool>;

    async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), PersistenceError>;

    async fn all_transactions(&self) -> anyhow::Result<Vec<TransactionRecord>>;
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.code().unwrap_or_default() == "23505")
}

#[async_trait]
impl LedgerRepo for PostgresConnection {
    async fn categories_by_kind(&self, kind: CategoryKind) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, models::ledger::Category>(
            r#"
            SELECT id, name, kind, emoji, comment
            FROM category
            WHERE kind = $1
            ORDER BY id
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&**self)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    async fn category_by_id(&self, id: i64) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query_as::<_, models::ledger::Category>(
            r#"
            SELECT id, name, kind, emoji, comment
            FROM category
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&**self)
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn category_exists(&self, name: &str, kind: CategoryKind) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM category WHERE name = $1 AND kind = $2)
            "#,
        )
        .bind(name)
        .bind(kind.as_str())
        .fetch_one(&**self)
        .await?;

        Ok(exists)
    }

    async fn add_category(&self, category: &NewCategory) -> Result<Category, PersistenceError> {
        let result = sqlx::query_as::<_, models::ledger::Category>(
            r#"
            INSERT INTO category (name, kind, emoji, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, kind, emoji, comment
            "#,
        )
        .bind(&category.name)
        .bind(category.kind.as_str())
        .bind(&category.emoji)
        .bind(&category.comment)
        .fetch_one(&**self)
        .await;

        match result {
            Ok(row) => Ok(Category::try_from(row)?),
            Err(error) if is_unique_violation(&error) => Err(PersistenceError::DuplicateCategory {
                name: category.name.clone(),
                kind: category.kind,
            }),
            Err(error) => Err(anyhow::Error::from(error)
                .context("Failed to insert category.")
                .into()),
        }
    }

    async fn all_accounts(&self) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, models::ledger::Account>(
            r#"
            SELECT id, name, currency, current_balance, comment
            FROM account
            ORDER BY id
            "#,
        )
        .fetch_all(&**self)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn account_by_id(&self, id: i64) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, models::ledger::Account>(
            r#"
            SELECT id, name, currency, current_balance, comment
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn account_exists(&self, name: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM account WHERE name = $1)")
                .bind(name)
                .fetch_one(&**self)
                .await?;

        Ok(exists)
    }

    async fn add_account(&self, account: &NewAccount) -> Result<Account, PersistenceError> {
        let result = sqlx::query_as::<_, models::ledger::Account>(
            r#"
            INSERT INTO account (name, currency, current_balance, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, currency, current_balance, comment
            "#,
        )
        .bind(&account.name)
        .bind(&account.currency)
        .bind(&account.balance)
        .bind(&account.comment)
        .fetch_one(&**self)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(error) if is_unique_violation(&error) => {
                Err(PersistenceError::DuplicateAccount(account.name.clone()))
            }
            Err(error) => Err(anyhow::Error::from(error)
                .context("Failed to insert account.")
                .into()),
        }
    }

    async fn update_account_balance(&self, id: i64, balance: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE account SET current_balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(id)
            .execute(&**self)
            .await
            .context("Failed to update account balance.")?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_transaction (
                kind,
                amount,
                category_name,
                comment,
                user_id,
                display_name,
                account_name,
                account_id,
                balance_before,
                balance_after
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(&transaction.category_name)
        .bind(&transaction.comment)
        .bind(transaction.author.user_id)
        .bind(&transaction.author.display_name)
        .bind(&transaction.account_name)
        .bind(transaction.account_id)
        .bind(&transaction.balance_before)
        .bind(&transaction.balance_after)
        .execute(&**self)
        .await
        .context("Failed to insert transaction.")?;

        Ok(())
    }

    async fn all_transactions(&self) -> anyhow::Result<Vec<TransactionRecord>> {
        let rows = sqlx::query_as::<_, models::ledger::Transaction>(
            r#"
            SELECT *
            FROM ledger_transaction
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&**self)
        .await?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }
}
