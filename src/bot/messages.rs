//! Everything the bot says.

use crate::{
    conversation::{
        input::{TextInvalidity, MAX_CURRENCY_LENGTH, MAX_NAME_LENGTH},
        state::{AccountDraft, CategoryDraft, TransactionDraft, TransferDraft},
    },
    ledger::domain::{
        accounts::Account,
        amounts::display_amount,
        categories::{Category, CategoryKind},
        reports::{PeriodSummary, StatsPeriod},
        transactions::TransactionKind,
    },
    ledger::services::Receipt,
};

pub const ACCESS_DENIED: &str = "⛔ Sorry, this bot is private.";
pub const START_OVER: &str = "🔄 Let's start over! Choose an action:";
pub const UNKNOWN_COMMAND: &str = "❓ Unknown command.";
pub const UNKNOWN_CALLBACK: &str = "❓ Unknown or outdated button.";
pub const CHOOSE_ACTION: &str = "Choose an action:";

pub const HELP: &str = "Available commands:
/addtransaction - add an income or expense
/addincome - add an income
/addexpense - add an expense
/addtransfer - move money between accounts
/addcategory - add a category
/addaccount - add an account
/balances - show account balances
/categories - list categories
/statsday, /statsweek, /statstwoweeks, /statsmonth, /stats30days - statistics
/cancel - abandon the current action";

pub const CHOOSE_TRANSACTION_TYPE: &str = "Choose the transaction type:";
pub const CHOOSE_ACCOUNT: &str = "Choose an account:";
pub const CHOOSE_CATEGORY: &str = "Choose a category:";
pub const ENTER_AMOUNT: &str = "Enter the amount:";
pub const INVALID_AMOUNT: &str = "❌ Please enter a positive number, eg 12.50";
pub const NO_ACCOUNTS: &str = "❌ There are no accounts yet. Add one with /addaccount";

pub const ENTER_CATEGORY_NAME: &str = "Enter the category name:";
pub const CHOOSE_CATEGORY_TYPE: &str = "Choose the category type:";
pub const ENTER_EMOJI: &str = "Send an emoji for the category:";
pub const EMPTY_EMOJI: &str = "❌ The emoji cannot be empty.";

pub const ENTER_ACCOUNT_NAME: &str = "Enter the account name:";
pub const ENTER_CURRENCY: &str = "Enter the account currency, eg USD:";
pub const ENTER_OPENING_BALANCE: &str = "Enter the current balance of the account:";
pub const INVALID_BALANCE: &str = "❌ Please enter a number that is zero or more, eg 100";

pub const CHOOSE_FROM_ACCOUNT: &str = "Choose the account to transfer from:";
pub const CHOOSE_TO_ACCOUNT: &str = "Choose the account to transfer to:";
pub const ENTER_TRANSFER_AMOUNT: &str = "Enter the amount to transfer:";
pub const SAME_ACCOUNT: &str = "❌ Choose a different account to transfer to.";
pub const NEED_TWO_ACCOUNTS: &str = "❌ A transfer needs at least 2 accounts. Add one with /addaccount";

pub const ENTER_COMMENT: &str = "💬 Enter a comment:";
pub const CANCELLED: &str = "🚫 Cancelled.";
pub const ACCOUNT_NOT_FOUND: &str = "❌ That account no longer exists.";
pub const CATEGORY_NOT_FOUND: &str = "❌ That category no longer exists.";

pub fn greeting(display_name: &str) -> String {
    format!("👋 Hi, {}! Choose an action:", display_name)
}

pub fn invalid_name(invalidity: &TextInvalidity) -> String {
    match invalidity {
        TextInvalidity::Empty => "❌ The name cannot be empty.".to_owned(),
        TextInvalidity::TooLong { .. } => format!(
            "❌ The name cannot be longer than {} characters.",
            MAX_NAME_LENGTH
        ),
    }
}

pub fn invalid_currency(invalidity: &TextInvalidity) -> String {
    match invalidity {
        TextInvalidity::Empty => "❌ The currency cannot be empty.".to_owned(),
        TextInvalidity::TooLong { .. } => format!(
            "❌ The currency cannot be longer than {} characters.",
            MAX_CURRENCY_LENGTH
        ),
    }
}

pub fn no_categories(kind: TransactionKind) -> String {
    format!(
        "❌ There are no {} categories yet. Add one with /addcategory",
        kind
    )
}

pub fn duplicate_category(name: &str, kind: CategoryKind) -> String {
    format!(
        "❌ The category \"{}\" already exists as {}. Choose another type or /cancel",
        name, kind
    )
}

pub fn duplicate_account(name: &str) -> String {
    format!(
        "❌ An account named \"{}\" already exists. Enter another name:",
        name
    )
}

pub fn failure(what: &str, error: &dyn std::fmt::Display) -> String {
    format!("❌ {} failed: {}", what, error)
}

pub fn transaction_kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "💵 Income",
        TransactionKind::Expense => "💸 Expense",
    }
}

pub fn category_kind_label(kind: CategoryKind) -> &'static str {
    match kind {
        CategoryKind::Income => "💵 Income",
        CategoryKind::Expense => "💸 Expense",
        CategoryKind::Transfer => "🔁 Transfer",
    }
}

fn comment_line(comment: &Option<String>) -> String {
    match comment.as_deref() {
        Some(comment) if !comment.is_empty() => format!("\nComment: {}", comment),
        _ => String::new(),
    }
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("?")
}

fn amount_or_unknown(amount: Option<f64>) -> String {
    amount.map(display_amount).unwrap_or_else(|| "?".to_owned())
}

pub fn transaction_summary(draft: &TransactionDraft) -> String {
    format!(
        "✅ Check the transaction:\nType: {}\nAccount: {}\nCategory: {}\nAmount: {}{}",
        draft.kind.map(transaction_kind_label).unwrap_or("?"),
        or_unknown(&draft.account_name),
        or_unknown(&draft.category_name),
        amount_or_unknown(draft.amount),
        comment_line(&draft.comment),
    )
}

pub fn category_summary(draft: &CategoryDraft) -> String {
    format!(
        "✅ Check the category:\nName: {}\nType: {}\nEmoji: {}{}",
        or_unknown(&draft.name),
        draft.kind.map(category_kind_label).unwrap_or("?"),
        or_unknown(&draft.emoji),
        comment_line(&draft.comment),
    )
}

pub fn account_summary(draft: &AccountDraft) -> String {
    format!(
        "✅ Check the account:\nName: {}\nCurrency: {}\nBalance: {}{}",
        or_unknown(&draft.name),
        or_unknown(&draft.currency),
        or_unknown(&draft.balance),
        comment_line(&draft.comment),
    )
}

pub fn transfer_summary(draft: &TransferDraft) -> String {
    format!(
        "✅ Check the transfer:\nFrom: {}\nTo: {}\nAmount: {}{}",
        or_unknown(&draft.from_account_name),
        or_unknown(&draft.to_account_name),
        amount_or_unknown(draft.amount),
        comment_line(&draft.comment),
    )
}

pub fn transaction_added(
    author: &str,
    kind: TransactionKind,
    amount: f64,
    category: &str,
    receipt: &Receipt,
) -> String {
    format!(
        "✅ {} added {} of {} {} ({})\nBalance of {}: {} {}",
        author,
        kind,
        display_amount(amount),
        receipt.currency,
        category,
        receipt.account_name,
        display_amount(receipt.balance_after),
        receipt.currency,
    )
}

pub fn category_added(author: &str, category: &Category) -> String {
    format!(
        "✅ {} added the {} category {} {}",
        author, category.kind, category.emoji, category.name
    )
}

pub fn account_added(author: &str, account: &Account) -> String {
    format!(
        "✅ {} added the account {} ({}) with a balance of {}",
        author, account.name, account.currency, account.current_balance
    )
}

pub fn transfer_added(author: &str, amount: f64, debit: &Receipt, credit: &Receipt) -> String {
    format!(
        "🔁 {} transferred {} from {} to {}\nBalance of {}: {} {}\nBalance of {}: {} {}",
        author,
        display_amount(amount),
        debit.account_name,
        credit.account_name,
        debit.account_name,
        display_amount(debit.balance_after),
        debit.currency,
        credit.account_name,
        display_amount(credit.balance_after),
        credit.currency,
    )
}

pub fn balances(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return NO_ACCOUNTS.to_owned();
    }

    let mut message = "💰 Account balances:\n".to_owned();
    for account in accounts {
        let balance = match account.balance() {
            Ok(balance) => display_amount(balance),
            Err(_) => account.current_balance.clone(),
        };
        message.push_str(&format!(
            "\n💳 {}: {} {}",
            account.name, balance, account.currency
        ));
    }

    message
}

pub fn categories(income: &[Category], expense: &[Category]) -> String {
    if income.is_empty() && expense.is_empty() {
        return "❌ There are no categories yet. Add one with /addcategory".to_owned();
    }

    let mut message = "📂 Categories:".to_owned();
    for (title, categories) in [("💵 Income", income), ("💸 Expense", expense)] {
        if categories.is_empty() {
            continue;
        }

        message.push_str(&format!("\n\n{}:", title));
        for category in categories {
            message.push_str(&format!("\n{} {}", category.emoji, category.name));
        }
    }

    message
}

pub fn stats(period: StatsPeriod, summary: &PeriodSummary, currency: &str) -> String {
    let range = if summary.start == summary.end {
        summary.end.format("%d.%m.%Y").to_string()
    } else {
        format!(
            "{} - {}",
            summary.start.format("%d.%m.%Y"),
            summary.end.format("%d.%m.%Y")
        )
    };

    if summary.is_empty() {
        return format!("📊 No transactions for {} ({})", period.title(), range);
    }

    let delta = summary.delta();
    let mut message = format!(
        "📊 Statistics for {} ({})\n\n💰 Net: {}{} {}\n💵 Income: +{} {}\n💸 Expense: -{} {}\n📋 Transactions: {}",
        period.title(),
        range,
        if delta > 0.0 { "+" } else { "" },
        display_amount(delta),
        currency,
        display_amount(summary.income),
        currency,
        display_amount(summary.expense),
        currency,
        summary.count,
    );

    if !summary.categories.is_empty() {
        message.push_str("\n\n📂 By category:");
        for total in &summary.categories {
            let sign = match total.kind {
                TransactionKind::Income => "+",
                TransactionKind::Expense => "-",
            };
            message.push_str(&format!(
                "\n  • {}: {}{} {}",
                total.name,
                sign,
                display_amount(total.amount),
                currency
            ));
        }
    }

    message
}
