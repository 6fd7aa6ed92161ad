use thiserror::Error;
use tracing::{error, info};

use crate::repos::{DynLedgerRepo, PersistenceError};

use super::domain::{
    accounts::{Account, NewAccount},
    amounts,
    categories::{Category, CategoryKind, NewCategory},
    transactions::{
        Author, NewTransaction, TransactionKind, TransactionRecord, TRANSFER_CREDIT,
        TRANSFER_DEBIT,
    },
};

/// A request to move money into or out of a single account.
#[derive(Clone, Debug)]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_name: String,
    pub comment: String,
    pub author: Author,
    pub account_id: i64,
}

/// A request to move money from one account to another.
#[derive(Clone, Debug)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: f64,
    pub comment: String,
    pub author: Author,
}

/// The outcome of a recorded transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt {
    pub account_name: String,
    pub currency: String,
    pub balance_after: f64,
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("account {0} does not exist")]
    AccountNotFound(i64),

    #[error("account {account:?} has an unreadable balance {balance:?}")]
    InvalidBalance { account: String, balance: String },

    #[error("transaction was not recorded: {0}")]
    NotRecorded(#[source] PersistenceError),

    /// The transaction row exists but the account still shows the old
    /// balance. The row is not rolled back.
    #[error("transaction was recorded but the balance of {account:?} was not updated: {error}")]
    BalanceNotUpdated {
        account: String,
        error: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("cannot transfer to the same account")]
    SameAccount,

    #[error("debit failed: {0}")]
    DebitFailed(#[source] TransactionError),

    /// The debit went through but the credit did not. Nothing is compensated.
    #[error("debit succeeded but credit failed: {error}")]
    CreditFailed {
        debit: Receipt,
        error: TransactionError,
    },
}

/// A service object providing the ledger operations the bot commits.
#[derive(Clone)]
pub struct LedgerService {
    repo: DynLedgerRepo,
}

impl LedgerService {
    pub fn new(repo: DynLedgerRepo) -> Self {
        Self { repo }
    }

    pub async fn categories(&self, kind: CategoryKind) -> anyhow::Result<Vec<Category>> {
        self.repo.categories_by_kind(kind).await
    }

    pub async fn category(&self, id: i64) -> anyhow::Result<Option<Category>> {
        self.repo.category_by_id(id).await
    }

    pub async fn category_exists(&self, name: &str, kind: CategoryKind) -> anyhow::Result<bool> {
        self.repo.category_exists(name, kind).await
    }

    pub async fn accounts(&self) -> anyhow::Result<Vec<Account>> {
        self.repo.all_accounts().await
    }

    pub async fn account(&self, id: i64) -> anyhow::Result<Option<Account>> {
        self.repo.account_by_id(id).await
    }

    pub async fn account_exists(&self, name: &str) -> anyhow::Result<bool> {
        self.repo.account_exists(name).await
    }

    pub async fn transactions(&self) -> anyhow::Result<Vec<TransactionRecord>> {
        self.repo.all_transactions().await
    }

    /// Create a category unless one with the same name and kind exists.
    ///
    /// The existence check happens before any write, so a duplicate leaves
    /// storage untouched.
    pub async fn add_category(&self, category: NewCategory) -> Result<Category, PersistenceError> {
        if self.repo.category_exists(&category.name, category.kind).await? {
            return Err(PersistenceError::DuplicateCategory {
                name: category.name,
                kind: category.kind,
            });
        }

        let stored = self.repo.add_category(&category).await?;
        info!(id = stored.id, name = %stored.name, kind = %stored.kind, "Added category.");

        Ok(stored)
    }

    /// Create an account unless one with the same name exists.
    pub async fn add_account(&self, account: NewAccount) -> Result<Account, PersistenceError> {
        if self.repo.account_exists(&account.name).await? {
            return Err(PersistenceError::DuplicateAccount(account.name));
        }

        let stored = self.repo.add_account(&account).await?;
        info!(id = stored.id, name = %stored.name, "Added account.");

        Ok(stored)
    }

    /// Write a transaction row and then move the account balance.
    ///
    /// The two writes are independent. If the balance write fails after the
    /// row was written, the row stays and
    /// [`TransactionError::BalanceNotUpdated`] is returned.
    pub async fn record_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<Receipt, TransactionError> {
        let account = self
            .repo
            .account_by_id(request.account_id)
            .await?
            .ok_or(TransactionError::AccountNotFound(request.account_id))?;

        let balance_before =
            account
                .balance()
                .map_err(|_| TransactionError::InvalidBalance {
                    account: account.name.clone(),
                    balance: account.current_balance.clone(),
                })?;
        let balance_after =
            amounts::round_to_cents(request.kind.apply(balance_before, request.amount));
        if !amounts::fits_in_cents(balance_after) {
            return Err(TransactionError::InvalidBalance {
                account: account.name,
                balance: balance_after.to_string(),
            });
        }
        let balance_after_string = amounts::to_decimal_string(balance_after);

        let transaction = NewTransaction {
            kind: request.kind,
            amount: request.amount,
            category_name: request.category_name,
            comment: request.comment,
            author: request.author,
            account_name: account.name.clone(),
            account_id: account.id,
            balance_before: account.current_balance.clone(),
            balance_after: balance_after_string.clone(),
        };

        self.repo
            .add_transaction(&transaction)
            .await
            .map_err(TransactionError::NotRecorded)?;

        match self
            .repo
            .update_account_balance(account.id, &balance_after_string)
            .await
        {
            Ok(true) => (),
            Ok(false) => {
                return Err(TransactionError::BalanceNotUpdated {
                    account: account.name,
                    error: anyhow::anyhow!("account disappeared before its balance was updated"),
                })
            }
            Err(error) => {
                error!(?error, account_id = account.id, "Failed to update account balance.");

                return Err(TransactionError::BalanceNotUpdated {
                    account: account.name,
                    error,
                });
            }
        }

        info!(
            account_id = account.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            balance = %balance_after_string,
            "Recorded transaction."
        );

        Ok(Receipt {
            account_name: account.name,
            currency: account.currency,
            balance_after,
        })
    }

    /// Move money between two accounts as a debit followed by a credit.
    ///
    /// The credit is only attempted once the debit succeeded. A failed credit
    /// leaves the debit in place.
    pub async fn transfer(
        &self,
        request: TransferRequest,
    ) -> Result<(Receipt, Receipt), TransferError> {
        if request.from_account_id == request.to_account_id {
            return Err(TransferError::SameAccount);
        }

        let from = self
            .require_account(request.from_account_id)
            .await
            .map_err(TransferError::DebitFailed)?;
        let to = self
            .require_account(request.to_account_id)
            .await
            .map_err(TransferError::DebitFailed)?;

        let debit = self
            .record_transaction(TransactionRequest {
                kind: TransactionKind::Expense,
                amount: request.amount,
                category_name: TRANSFER_DEBIT.to_owned(),
                comment: transfer_comment(&request.comment, "to", &to.name),
                author: request.author.clone(),
                account_id: from.id,
            })
            .await
            .map_err(TransferError::DebitFailed)?;

        let credit = self
            .record_transaction(TransactionRequest {
                kind: TransactionKind::Income,
                amount: request.amount,
                category_name: TRANSFER_CREDIT.to_owned(),
                comment: transfer_comment(&request.comment, "from", &from.name),
                author: request.author,
                account_id: to.id,
            })
            .await;

        match credit {
            Ok(credit) => Ok((debit, credit)),
            Err(error) => {
                error!(?error, from = from.id, to = to.id, "Transfer credit failed after debit.");

                Err(TransferError::CreditFailed { debit, error })
            }
        }
    }

    async fn require_account(&self, id: i64) -> Result<Account, TransactionError> {
        self.repo
            .account_by_id(id)
            .await?
            .ok_or(TransactionError::AccountNotFound(id))
    }
}

fn transfer_comment(comment: &str, direction: &str, account_name: &str) -> String {
    if comment.is_empty() {
        format!("Transfer {} {}", direction, account_name)
    } else {
        format!("{} (transfer {} {})", comment, direction, account_name)
    }
}
