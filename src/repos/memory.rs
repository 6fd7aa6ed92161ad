use std::{collections::HashSet, sync::Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;

use crate::ledger::domain::{
    accounts::{Account, NewAccount},
    categories::{Category, CategoryKind, NewCategory},
    transactions::{NewTransaction, TransactionRecord},
};

use super::{LedgerRepo, PersistenceError};

/// A write that reached the repository.
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    Category(NewCategory),
    Account(NewAccount),
    Balance { account_id: i64, balance: String },
    Transaction(NewTransaction),
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    categories: Vec<Category>,
    accounts: Vec<Account>,
    transactions: Vec<TransactionRecord>,
    writes: Vec<Write>,
    failing_transaction_accounts: HashSet<i64>,
    failing_balance_accounts: HashSet<i64>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`LedgerRepo`] keeping everything in memory, with a log of every write.
#[derive(Default)]
pub struct MemoryLedgerRepo {
    tables: Mutex<Tables>,
}

impl MemoryLedgerRepo {
    /// Insert an account without recording a write.
    pub fn seed_account(&self, name: &str, currency: &str, balance: &str) -> Account {
        let mut tables = self.tables.lock().unwrap();
        let account = Account {
            id: tables.next_id(),
            name: name.to_owned(),
            currency: currency.to_owned(),
            current_balance: balance.to_owned(),
            comment: String::new(),
        };
        tables.accounts.push(account.clone());

        account
    }

    /// Insert a category without recording a write.
    pub fn seed_category(&self, name: &str, kind: CategoryKind, emoji: &str) -> Category {
        let mut tables = self.tables.lock().unwrap();
        let category = Category {
            id: tables.next_id(),
            name: name.to_owned(),
            kind,
            emoji: emoji.to_owned(),
            comment: String::new(),
        };
        tables.categories.push(category.clone());

        category
    }

    /// Make every transaction write against the account fail.
    pub fn fail_transactions_for(&self, account_id: i64) {
        self.tables
            .lock()
            .unwrap()
            .failing_transaction_accounts
            .insert(account_id);
    }

    /// Make every balance update of the account fail.
    pub fn fail_balance_updates_for(&self, account_id: i64) {
        self.tables
            .lock()
            .unwrap()
            .failing_balance_accounts
            .insert(account_id);
    }

    pub fn writes(&self) -> Vec<Write> {
        self.tables.lock().unwrap().writes.clone()
    }

    pub fn balance_of(&self, account_id: i64) -> Option<String> {
        self.tables
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|account| account.id == account_id)
            .map(|account| account.current_balance.clone())
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.tables.lock().unwrap().transactions.clone()
    }
}

#[async_trait]
impl LedgerRepo for MemoryLedgerRepo {
    async fn categories_by_kind(&self, kind: CategoryKind) -> anyhow::Result<Vec<Category>> {
        let tables = self.tables.lock().unwrap();

        Ok(tables
            .categories
            .iter()
            .filter(|category| category.kind == kind)
            .cloned()
            .collect())
    }

    async fn category_by_id(&self, id: i64) -> anyhow::Result<Option<Category>> {
        let tables = self.tables.lock().unwrap();

        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn category_exists(&self, name: &str, kind: CategoryKind) -> anyhow::Result<bool> {
        let tables = self.tables.lock().unwrap();

        Ok(tables
            .categories
            .iter()
            .any(|category| category.name == name && category.kind == kind))
    }

    async fn add_category(&self, category: &NewCategory) -> Result<Category, PersistenceError> {
        let mut tables = self.tables.lock().unwrap();

        if tables
            .categories
            .iter()
            .any(|c| c.name == category.name && c.kind == category.kind)
        {
            return Err(PersistenceError::DuplicateCategory {
                name: category.name.clone(),
                kind: category.kind,
            });
        }

        let stored = Category {
            id: tables.next_id(),
            name: category.name.clone(),
            kind: category.kind,
            emoji: category.emoji.clone(),
            comment: category.comment.clone(),
        };
        tables.categories.push(stored.clone());
        tables.writes.push(Write::Category(category.clone()));

        Ok(stored)
    }

    async fn all_accounts(&self) -> anyhow::Result<Vec<Account>> {
        Ok(self.tables.lock().unwrap().accounts.clone())
    }

    async fn account_by_id(&self, id: i64) -> anyhow::Result<Option<Account>> {
        let tables = self.tables.lock().unwrap();

        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn account_exists(&self, name: &str) -> anyhow::Result<bool> {
        let tables = self.tables.lock().unwrap();

        Ok(tables.accounts.iter().any(|account| account.name == name))
    }

    async fn add_account(&self, account: &NewAccount) -> Result<Account, PersistenceError> {
        let mut tables = self.tables.lock().unwrap();

        if tables.accounts.iter().any(|a| a.name == account.name) {
            return Err(PersistenceError::DuplicateAccount(account.name.clone()));
        }

        let stored = Account {
            id: tables.next_id(),
            name: account.name.clone(),
            currency: account.currency.clone(),
            current_balance: account.balance.clone(),
            comment: account.comment.clone(),
        };
        tables.accounts.push(stored.clone());
        tables.writes.push(Write::Account(account.clone()));

        Ok(stored)
    }

    async fn update_account_balance(&self, id: i64, balance: &str) -> anyhow::Result<bool> {
        let mut tables = self.tables.lock().unwrap();

        if tables.failing_balance_accounts.contains(&id) {
            return Err(anyhow!("balance column is locked"));
        }

        let updated = match tables.accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.current_balance = balance.to_owned();
                true
            }
            None => false,
        };

        if updated {
            tables.writes.push(Write::Balance {
                account_id: id,
                balance: balance.to_owned(),
            });
        }

        Ok(updated)
    }

    async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), PersistenceError> {
        let mut tables = self.tables.lock().unwrap();

        if tables
            .failing_transaction_accounts
            .contains(&transaction.account_id)
        {
            return Err(anyhow!("sheet is read only").into());
        }

        let record = TransactionRecord {
            id: tables.next_id(),
            kind: transaction.kind,
            amount: transaction.amount,
            category_name: transaction.category_name.clone(),
            comment: transaction.comment.clone(),
            user_id: transaction.author.user_id,
            display_name: transaction.author.display_name.clone(),
            account_name: transaction.account_name.clone(),
            account_id: transaction.account_id,
            balance_before: transaction.balance_before.clone(),
            balance_after: transaction.balance_after.clone(),
            created_at: Utc::now(),
        };
        tables.transactions.push(record);
        tables.writes.push(Write::Transaction(transaction.clone()));

        Ok(())
    }

    async fn all_transactions(&self) -> anyhow::Result<Vec<TransactionRecord>> {
        Ok(self.tables.lock().unwrap().transactions.clone())
    }
}
