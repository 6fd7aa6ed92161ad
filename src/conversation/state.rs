//! Where a user is within a flow, and the answers gathered so far.

use serde::{Deserialize, Serialize};

use crate::ledger::domain::{categories::CategoryKind, transactions::TransactionKind};

/// A single position within one of the flows. [`Step::Default`] means no flow
/// is active.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Default,

    AddTransactionType,
    AddTransactionAccount,
    AddTransactionCategory,
    AddTransactionAmount,
    AddTransactionComment,
    AddTransactionConfirm,

    AddCategoryName,
    AddCategoryType,
    AddCategoryEmoji,
    AddCategoryComment,
    AddCategoryConfirm,

    AddAccountName,
    AddAccountCurrency,
    AddAccountAmount,
    AddAccountComment,
    AddAccountConfirm,

    AddTransferFromAccount,
    AddTransferToAccount,
    AddTransferAmount,
    AddTransferComment,
    AddTransferConfirm,
}

impl Step {
    /// The flow this step belongs to, if any.
    pub fn flow(&self) -> Option<Flow> {
        use Step::*;

        match self {
            Default => None,
            AddTransactionType | AddTransactionAccount | AddTransactionCategory
            | AddTransactionAmount | AddTransactionComment | AddTransactionConfirm => {
                Some(Flow::Transaction)
            }
            AddCategoryName | AddCategoryType | AddCategoryEmoji | AddCategoryComment
            | AddCategoryConfirm => Some(Flow::Category),
            AddAccountName | AddAccountCurrency | AddAccountAmount | AddAccountComment
            | AddAccountConfirm => Some(Flow::Account),
            AddTransferFromAccount | AddTransferToAccount | AddTransferAmount
            | AddTransferComment | AddTransferConfirm => Some(Flow::Transfer),
        }
    }
}

/// One of the multi-step tasks a user can work through.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Flow {
    Transaction,
    Category,
    Account,
    Transfer,
}

impl Flow {
    pub fn confirm_step(&self) -> Step {
        match self {
            Self::Transaction => Step::AddTransactionConfirm,
            Self::Category => Step::AddCategoryConfirm,
            Self::Account => Step::AddAccountConfirm,
            Self::Transfer => Step::AddTransferConfirm,
        }
    }

    pub fn comment_step(&self) -> Step {
        match self {
            Self::Transaction => Step::AddTransactionComment,
            Self::Category => Step::AddCategoryComment,
            Self::Account => Step::AddAccountComment,
            Self::Transfer => Step::AddTransferComment,
        }
    }

    /// The step an edit at confirmation goes back to.
    pub fn edit_step(&self) -> Step {
        match self {
            Self::Transaction => Step::AddTransactionAmount,
            Self::Category => Step::AddCategoryName,
            Self::Account => Step::AddAccountName,
            Self::Transfer => Step::AddTransferFromAccount,
        }
    }
}

fn overlay<T>(target: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *target = patch;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDraft {
    pub kind: Option<TransactionKind>,
    pub account_id: Option<i64>,
    pub account_name: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub amount: Option<f64>,
    pub comment: Option<String>,
}

impl TransactionDraft {
    fn merge(&mut self, patch: Self) {
        overlay(&mut self.kind, patch.kind);
        overlay(&mut self.account_id, patch.account_id);
        overlay(&mut self.account_name, patch.account_name);
        overlay(&mut self.category_id, patch.category_id);
        overlay(&mut self.category_name, patch.category_name);
        overlay(&mut self.amount, patch.amount);
        overlay(&mut self.comment, patch.comment);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub emoji: Option<String>,
    pub comment: Option<String>,
}

impl CategoryDraft {
    fn merge(&mut self, patch: Self) {
        overlay(&mut self.name, patch.name);
        overlay(&mut self.kind, patch.kind);
        overlay(&mut self.emoji, patch.emoji);
        overlay(&mut self.comment, patch.comment);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountDraft {
    pub name: Option<String>,
    pub currency: Option<String>,
    /// Opening balance as a decimal string.
    pub balance: Option<String>,
    pub comment: Option<String>,
}

impl AccountDraft {
    fn merge(&mut self, patch: Self) {
        overlay(&mut self.name, patch.name);
        overlay(&mut self.currency, patch.currency);
        overlay(&mut self.balance, patch.balance);
        overlay(&mut self.comment, patch.comment);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferDraft {
    pub from_account_id: Option<i64>,
    pub from_account_name: Option<String>,
    pub to_account_id: Option<i64>,
    pub to_account_name: Option<String>,
    pub amount: Option<f64>,
    pub comment: Option<String>,
}

impl TransferDraft {
    fn merge(&mut self, patch: Self) {
        overlay(&mut self.from_account_id, patch.from_account_id);
        overlay(&mut self.from_account_name, patch.from_account_name);
        overlay(&mut self.to_account_id, patch.to_account_id);
        overlay(&mut self.to_account_name, patch.to_account_name);
        overlay(&mut self.amount, patch.amount);
        overlay(&mut self.comment, patch.comment);
    }
}

/// The answers staged for the active flow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "lowercase")]
pub enum Draft {
    #[default]
    Empty,
    Transaction(TransactionDraft),
    Category(CategoryDraft),
    Account(AccountDraft),
    Transfer(TransferDraft),
}

impl Draft {
    /// Merge a patch into this draft field by field. Fields set in the patch
    /// win. A patch for another flow replaces the draft, and an empty patch
    /// changes nothing.
    pub fn merge(self, patch: Draft) -> Draft {
        match (self, patch) {
            (draft, Draft::Empty) => draft,
            (Draft::Transaction(mut draft), Draft::Transaction(patch)) => {
                draft.merge(patch);
                Draft::Transaction(draft)
            }
            (Draft::Category(mut draft), Draft::Category(patch)) => {
                draft.merge(patch);
                Draft::Category(draft)
            }
            (Draft::Account(mut draft), Draft::Account(patch)) => {
                draft.merge(patch);
                Draft::Account(draft)
            }
            (Draft::Transfer(mut draft), Draft::Transfer(patch)) => {
                draft.merge(patch);
                Draft::Transfer(draft)
            }
            (_, patch) => patch,
        }
    }

    /// Staged comment, whichever flow is active.
    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Transaction(draft) => draft.comment.as_deref(),
            Self::Category(draft) => draft.comment.as_deref(),
            Self::Account(draft) => draft.comment.as_deref(),
            Self::Transfer(draft) => draft.comment.as_deref(),
        }
    }

    /// A patch for the given flow that only sets the comment.
    pub fn comment_patch(flow: Flow, comment: String) -> Draft {
        match flow {
            Flow::Transaction => Draft::Transaction(TransactionDraft {
                comment: Some(comment),
                ..Default::default()
            }),
            Flow::Category => Draft::Category(CategoryDraft {
                comment: Some(comment),
                ..Default::default()
            }),
            Flow::Account => Draft::Account(AccountDraft {
                comment: Some(comment),
                ..Default::default()
            }),
            Flow::Transfer => Draft::Transfer(TransferDraft {
                comment: Some(comment),
                ..Default::default()
            }),
        }
    }
}

/// Everything known about one user's conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub step: Step,
    #[serde(default)]
    pub draft: Draft,
}
