//! Adding an account.

use semval::ValidatedFrom;
use tracing::warn;

use crate::{
    conversation::{
        input::{extract_number, CurrencyCode, Name},
        state::AccountDraft,
        Draft, Step,
    },
    ledger::domain::{accounts::NewAccount, amounts::to_decimal_string},
    repos::PersistenceError,
    telegram::types::Sender,
};

use super::{keyboards, messages, Bot};

pub(super) async fn start(bot: &Bot, sender: &Sender) {
    bot.states.set(
        sender.chat_id,
        Step::AddAccountName,
        Draft::Account(AccountDraft::default()),
    );
    bot.say(sender.chat_id, messages::ENTER_ACCOUNT_NAME).await;
}

/// Stage the name unless an account already uses it.
pub(super) async fn enter_name(bot: &Bot, sender: &Sender, text: &str) {
    let chat = sender.chat_id;

    let name = match Name::validated_from(text) {
        Ok(name) => name.into_inner(),
        Err((_, context)) => {
            for invalidity in context.into_iter().take(1) {
                bot.say(chat, &messages::invalid_name(&invalidity)).await;
            }
            return;
        }
    };

    match bot.ledger.account_exists(&name).await {
        Ok(true) => return bot.say(chat, &messages::duplicate_account(&name)).await,
        Ok(false) => (),
        Err(error) => return bot.fail(chat, "Checking the account", error).await,
    }

    let patch = Draft::Account(AccountDraft {
        name: Some(name),
        ..Default::default()
    });

    if bot.stage(chat, patch, Step::AddAccountCurrency).await.is_some() {
        bot.say(chat, messages::ENTER_CURRENCY).await;
    }
}

pub(super) async fn enter_currency(bot: &Bot, sender: &Sender, text: &str) {
    let chat = sender.chat_id;

    let currency = match CurrencyCode::validated_from(text) {
        Ok(currency) => currency.into_inner(),
        Err((_, context)) => {
            for invalidity in context.into_iter().take(1) {
                bot.say(chat, &messages::invalid_currency(&invalidity)).await;
            }
            return;
        }
    };

    let patch = Draft::Account(AccountDraft {
        currency: Some(currency),
        ..Default::default()
    });

    if bot.stage(chat, patch, Step::AddAccountAmount).await.is_some() {
        bot.say(chat, messages::ENTER_OPENING_BALANCE).await;
    }
}

/// Stage the opening balance. Unlike other amounts, zero is fine here.
pub(super) async fn enter_amount(bot: &Bot, sender: &Sender, text: &str) {
    let chat = sender.chat_id;

    let balance = match extract_number(text) {
        Some(balance) => to_decimal_string(balance),
        None => return bot.say(chat, messages::INVALID_BALANCE).await,
    };

    let patch = Draft::Account(AccountDraft {
        balance: Some(balance),
        ..Default::default()
    });

    if let Some(state) = bot.stage(chat, patch, Step::AddAccountConfirm).await {
        bot.show_confirmation(chat, &state).await;
    }
}

pub(super) async fn commit(bot: &Bot, sender: &Sender, draft: AccountDraft) {
    let chat = sender.chat_id;

    let account = match (draft.name, draft.currency, draft.balance) {
        (Some(name), Some(currency), Some(balance)) => NewAccount {
            name,
            currency,
            balance,
            comment: draft.comment.unwrap_or_default(),
        },
        _ => return bot.reset_with(chat, messages::START_OVER).await,
    };

    let result = bot.ledger.add_account(account).await;
    bot.states.reset(chat);

    match result {
        Ok(account) => {
            bot.broadcast(&messages::account_added(&sender.display_name, &account))
                .await;
            bot.offer(chat, messages::CHOOSE_ACTION, &keyboards::main_menu())
                .await;
        }
        Err(PersistenceError::DuplicateAccount(name)) => {
            bot.offer(
                chat,
                &messages::duplicate_account(&name),
                &keyboards::main_menu(),
            )
            .await;
        }
        Err(error) => {
            warn!(?error, %chat, "Account was not added.");
            bot.offer(
                chat,
                &messages::failure("Adding the account", &error),
                &keyboards::main_menu(),
            )
            .await;
        }
    }
}
