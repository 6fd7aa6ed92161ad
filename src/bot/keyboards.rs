use crate::{
    conversation::{callbacks::CallbackToken, commands::*, confirm::ConfirmAction},
    ledger::domain::{
        accounts::Account,
        categories::{Category, CategoryKind},
        transactions::TransactionKind,
    },
    telegram::clients::{InlineButton, Keyboard},
};

use super::messages::{category_kind_label, transaction_kind_label};

const ACCOUNTS_PER_ROW: usize = 2;
const CATEGORIES_PER_ROW: usize = 3;

fn reply_row(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| (*label).to_owned()).collect()
}

/// The persistent menu shown between flows.
pub fn main_menu() -> Keyboard {
    Keyboard::Reply(vec![
        reply_row(&[ADD_TRANSACTION_BUTTON]),
        reply_row(&[INCOME_BUTTON, EXPENSE_BUTTON, TRANSFER_BUTTON]),
        reply_row(&[BALANCES_BUTTON, CATEGORIES_BUTTON]),
        reply_row(&[STATS_DAY_BUTTON, STATS_WEEK_BUTTON, STATS_MONTH_BUTTON]),
        reply_row(&[STATS_TWO_WEEKS_BUTTON, STATS_THIRTY_DAYS_BUTTON]),
        reply_row(&[ADD_CATEGORY_BUTTON, ADD_ACCOUNT_BUTTON]),
        reply_row(&[CANCEL_BUTTON]),
    ])
}

pub fn transaction_types() -> Keyboard {
    Keyboard::Inline(vec![[TransactionKind::Income, TransactionKind::Expense]
        .into_iter()
        .map(|kind| {
            InlineButton::new(
                transaction_kind_label(kind),
                CallbackToken::TransactionType(kind),
            )
        })
        .collect()])
}

pub fn category_types() -> Keyboard {
    Keyboard::Inline(vec![CategoryKind::ALL
        .into_iter()
        .map(|kind| InlineButton::new(category_kind_label(kind), CallbackToken::CategoryType(kind)))
        .collect()])
}

/// Accounts, two to a row, each answering with `token(account.id)`.
pub fn accounts<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    token: fn(i64) -> CallbackToken,
) -> Keyboard {
    let buttons: Vec<InlineButton> = accounts
        .into_iter()
        .map(|account| InlineButton::new(account.name.clone(), token(account.id)))
        .collect();

    Keyboard::Inline(buttons.chunks(ACCOUNTS_PER_ROW).map(<[_]>::to_vec).collect())
}

/// Categories with their emoji, three to a row.
pub fn categories(categories: &[Category]) -> Keyboard {
    let buttons: Vec<InlineButton> = categories
        .iter()
        .map(|category| {
            InlineButton::new(
                format!("{} {}", category.emoji, category.name),
                CallbackToken::Category(category.id),
            )
        })
        .collect();

    Keyboard::Inline(
        buttons
            .chunks(CATEGORIES_PER_ROW)
            .map(<[_]>::to_vec)
            .collect(),
    )
}

pub fn confirmation() -> Keyboard {
    let button = |label: &str, action| InlineButton::new(label, CallbackToken::Decision(action));

    Keyboard::Inline(vec![
        vec![
            button("✅ Confirm", ConfirmAction::Confirm),
            button("❌ Cancel", ConfirmAction::Cancel),
        ],
        vec![
            button("✏️ Edit", ConfirmAction::Edit),
            button("💬 Comment", ConfirmAction::Comment),
        ],
    ])
}
