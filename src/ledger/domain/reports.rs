use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use super::transactions::{TransactionKind, TransactionRecord};

/// A reporting window ending today (inclusive).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatsPeriod {
    Day,
    Week,
    TwoWeeks,
    Month,
    ThirtyDays,
}

impl StatsPeriod {
    /// The first day included in the period.
    ///
    /// # Arguments
    /// * `today` - The last day of the period, as a UTC date.
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => today,
            Self::Week => today - Duration::days(6),
            Self::TwoWeeks => today - Duration::days(13),
            Self::Month => today.with_day(1).unwrap_or(today),
            Self::ThirtyDays => today - Duration::days(29),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Day => "today",
            Self::Week => "the week",
            Self::TwoWeeks => "two weeks",
            Self::Month => "the month",
            Self::ThirtyDays => "30 days",
        }
    }
}

/// The total of a single category within a period. Categories are told apart
/// by name and kind, so an income and an expense category may share a name.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub kind: TransactionKind,
    pub amount: f64,
}

/// Aggregated income and spending over a [`StatsPeriod`].
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub count: usize,
    /// Sorted by amount, largest first.
    pub categories: Vec<CategoryTotal>,
}

impl PeriodSummary {
    /// Income minus expense.
    pub fn delta(&self) -> f64 {
        self.income - self.expense
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarize the records that fall into a period. Transfer halves are skipped
/// since they only move money between accounts.
pub fn summarize(
    records: &[TransactionRecord],
    period: StatsPeriod,
    today: NaiveDate,
) -> PeriodSummary {
    let start = period.start(today);

    let mut income = 0.0;
    let mut expense = 0.0;
    let mut count = 0;
    let mut totals: HashMap<(&str, TransactionKind), CategoryTotal> = HashMap::new();

    let in_period = records.iter().filter(|record| {
        let date = record.created_at.date_naive();

        !record.is_transfer() && date >= start && date <= today
    });

    for record in in_period {
        count += 1;

        match record.kind {
            TransactionKind::Income => income += record.amount,
            TransactionKind::Expense => expense += record.amount,
        }

        totals
            .entry((record.category_name.as_str(), record.kind))
            .or_insert_with(|| CategoryTotal {
                name: record.category_name.clone(),
                kind: record.kind,
                amount: 0.0,
            })
            .amount += record.amount;
    }

    let mut categories: Vec<CategoryTotal> = totals.into_values().collect();
    categories.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
    });

    PeriodSummary {
        start,
        end: today,
        income,
        expense,
        count,
        categories,
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ledger::domain::transactions::TRANSFER_DEBIT;

    fn record(day: u32, kind: TransactionKind, amount: f64, category: &str) -> TransactionRecord {
        TransactionRecord {
            id: i64::from(day),
            kind,
            amount,
            category_name: category.to_owned(),
            comment: String::new(),
            user_id: 1,
            display_name: "Tester".to_owned(),
            account_name: "Cash".to_owned(),
            account_id: 1,
            balance_before: "0".to_owned(),
            balance_after: "0".to_owned(),
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn period_starts() {
        let today = date(20);

        assert_eq!(date(20), StatsPeriod::Day.start(today));
        assert_eq!(date(14), StatsPeriod::Week.start(today));
        assert_eq!(date(7), StatsPeriod::TwoWeeks.start(today));
        assert_eq!(date(1), StatsPeriod::Month.start(today));
        assert_eq!(
            NaiveDate::from_ymd_opt(2025, 2, 19).unwrap(),
            StatsPeriod::ThirtyDays.start(today)
        );
    }

    #[test]
    fn summarize_week() {
        let records = vec![
            record(10, TransactionKind::Expense, 99.0, "Food"),
            record(15, TransactionKind::Income, 1000.0, "Salary"),
            record(16, TransactionKind::Expense, 20.0, "Food"),
            record(18, TransactionKind::Expense, 30.5, "Food"),
            record(19, TransactionKind::Expense, 15.0, "Taxi"),
            record(19, TransactionKind::Expense, 500.0, TRANSFER_DEBIT),
        ];

        let summary = summarize(&records, StatsPeriod::Week, date(20));

        assert_eq!(4, summary.count);
        assert_eq!(1000.0, summary.income);
        assert_eq!(65.5, summary.expense);
        assert_eq!(934.5, summary.delta());
        assert_eq!(
            vec!["Salary", "Food", "Taxi"],
            summary
                .categories
                .iter()
                .map(|total| total.name.as_str())
                .collect::<Vec<_>>()
        );
        assert_eq!(50.5, summary.categories[1].amount);
    }

    #[test]
    fn same_name_is_kept_apart_by_kind() {
        let records = vec![
            record(18, TransactionKind::Income, 100.0, "Gifts"),
            record(19, TransactionKind::Expense, 40.0, "Gifts"),
            record(20, TransactionKind::Expense, 10.0, "Gifts"),
        ];

        let summary = summarize(&records, StatsPeriod::Week, date(20));

        assert_eq!(
            vec![
                CategoryTotal {
                    name: "Gifts".to_owned(),
                    kind: TransactionKind::Income,
                    amount: 100.0,
                },
                CategoryTotal {
                    name: "Gifts".to_owned(),
                    kind: TransactionKind::Expense,
                    amount: 50.0,
                },
            ],
            summary.categories
        );
        assert_eq!(100.0, summary.income);
        assert_eq!(50.0, summary.expense);
    }

    #[test]
    fn summarize_empty_period() {
        let records = vec![record(1, TransactionKind::Income, 10.0, "Gift")];

        let summary = summarize(&records, StatsPeriod::Day, date(20));

        assert!(summary.is_empty());
        assert!(summary.categories.is_empty());
    }
}
