use crate::ledger::domain::reports::StatsPeriod;

pub const ADD_TRANSACTION_BUTTON: &str = "📝 Add transaction";
pub const INCOME_BUTTON: &str = "💵 Income";
pub const EXPENSE_BUTTON: &str = "💸 Expense";
pub const TRANSFER_BUTTON: &str = "🔁 Transfer";
pub const ADD_CATEGORY_BUTTON: &str = "📝 Add category";
pub const ADD_ACCOUNT_BUTTON: &str = "📝 Add account";
pub const BALANCES_BUTTON: &str = "💳 Balances";
pub const CATEGORIES_BUTTON: &str = "📂 Categories";
pub const CANCEL_BUTTON: &str = "❌ Cancel";
pub const STATS_DAY_BUTTON: &str = "📊 Today";
pub const STATS_WEEK_BUTTON: &str = "📊 Week";
pub const STATS_TWO_WEEKS_BUTTON: &str = "📊 Two weeks";
pub const STATS_MONTH_BUTTON: &str = "📊 Month";
pub const STATS_THIRTY_DAYS_BUTTON: &str = "📊 30 days";

/// A text message that means the same thing in every step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Start,
    Help,
    Cancel,
    AddTransaction,
    AddIncome,
    AddExpense,
    AddTransfer,
    AddCategory,
    AddAccount,
    Balances,
    Categories,
    Stats(StatsPeriod),
}

impl Command {
    /// Recognize a slash command or the label of a menu button.
    ///
    /// Slash commands may carry the bot's name, as in `/start@finance_bot`,
    /// and trailing arguments are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Some(command) = text.strip_prefix('/') {
            let word = command.split_whitespace().next().unwrap_or_default();
            let name = word.split('@').next().unwrap_or_default();

            return Self::from_slash(&name.to_lowercase());
        }

        Self::from_button(text)
    }

    fn from_slash(name: &str) -> Option<Self> {
        let command = match name {
            "start" => Self::Start,
            "help" => Self::Help,
            "cancel" => Self::Cancel,
            "addtransaction" => Self::AddTransaction,
            "addincome" => Self::AddIncome,
            "addexpense" => Self::AddExpense,
            "addtransfer" => Self::AddTransfer,
            "addcategory" => Self::AddCategory,
            "addaccount" => Self::AddAccount,
            "balances" => Self::Balances,
            "categories" => Self::Categories,
            "statsday" => Self::Stats(StatsPeriod::Day),
            "statsweek" => Self::Stats(StatsPeriod::Week),
            "statstwoweeks" => Self::Stats(StatsPeriod::TwoWeeks),
            "statsmonth" => Self::Stats(StatsPeriod::Month),
            "stats30days" => Self::Stats(StatsPeriod::ThirtyDays),
            _ => return None,
        };

        Some(command)
    }

    fn from_button(label: &str) -> Option<Self> {
        let command = match label {
            ADD_TRANSACTION_BUTTON => Self::AddTransaction,
            INCOME_BUTTON => Self::AddIncome,
            EXPENSE_BUTTON => Self::AddExpense,
            TRANSFER_BUTTON => Self::AddTransfer,
            ADD_CATEGORY_BUTTON => Self::AddCategory,
            ADD_ACCOUNT_BUTTON => Self::AddAccount,
            BALANCES_BUTTON => Self::Balances,
            CATEGORIES_BUTTON => Self::Categories,
            CANCEL_BUTTON => Self::Cancel,
            STATS_DAY_BUTTON => Self::Stats(StatsPeriod::Day),
            STATS_WEEK_BUTTON => Self::Stats(StatsPeriod::Week),
            STATS_TWO_WEEKS_BUTTON => Self::Stats(StatsPeriod::TwoWeeks),
            STATS_MONTH_BUTTON => Self::Stats(StatsPeriod::Month),
            STATS_THIRTY_DAYS_BUTTON => Self::Stats(StatsPeriod::ThirtyDays),
            _ => return None,
        };

        Some(command)
    }
}
