//! Read-only commands. None of them touch the conversation state.

use chrono::Utc;

use crate::{
    ledger::domain::{
        categories::CategoryKind,
        reports::{summarize, StatsPeriod},
    },
    telegram::types::ChatId,
};

use super::{keyboards, messages, Bot};

pub(super) async fn balances(bot: &Bot, chat: ChatId) {
    match bot.ledger.accounts().await {
        Ok(accounts) => {
            bot.offer(chat, &messages::balances(&accounts), &keyboards::main_menu())
                .await
        }
        Err(error) => bot.fail(chat, "Loading balances", error).await,
    }
}

pub(super) async fn categories(bot: &Bot, chat: ChatId) {
    let income = match bot.ledger.categories(CategoryKind::Income).await {
        Ok(income) => income,
        Err(error) => return bot.fail(chat, "Loading categories", error).await,
    };
    let expense = match bot.ledger.categories(CategoryKind::Expense).await {
        Ok(expense) => expense,
        Err(error) => return bot.fail(chat, "Loading categories", error).await,
    };

    bot.offer(
        chat,
        &messages::categories(&income, &expense),
        &keyboards::main_menu(),
    )
    .await;
}

/// Totals for a period ending today, in UTC.
pub(super) async fn stats(bot: &Bot, chat: ChatId, period: StatsPeriod) {
    let records = match bot.ledger.transactions().await {
        Ok(records) => records,
        Err(error) => return bot.fail(chat, "Loading statistics", error).await,
    };

    let summary = summarize(&records, period, Utc::now().date_naive());

    bot.offer(
        chat,
        &messages::stats(period, &summary, &bot.currency_label),
        &keyboards::main_menu(),
    )
    .await;
}
