//! Moving money between two accounts.

use tracing::warn;

use crate::{
    conversation::{
        callbacks::CallbackToken, input::extract_amount, state::TransferDraft, Draft, Step,
    },
    ledger::{
        domain::{accounts::Account, transactions::Author},
        services::{TransferError, TransferRequest},
    },
    telegram::types::{ChatId, Sender},
};

use super::{keyboards, messages, Bot};

pub(super) async fn start(bot: &Bot, sender: &Sender) {
    bot.states.set(
        sender.chat_id,
        Step::AddTransferFromAccount,
        Draft::Transfer(TransferDraft::default()),
    );
    ask_from(bot, sender.chat_id).await
}

/// Offer the accounts to transfer from, provided there are at least two.
pub(super) async fn ask_from(bot: &Bot, chat: ChatId) {
    let accounts = match bot.ledger.accounts().await {
        Ok(accounts) => accounts,
        Err(error) => return bot.fail(chat, "Loading accounts", error).await,
    };
    if accounts.len() < 2 {
        return bot.reset_with(chat, messages::NEED_TWO_ACCOUNTS).await;
    }

    bot.offer(
        chat,
        messages::CHOOSE_FROM_ACCOUNT,
        &keyboards::accounts(&accounts, CallbackToken::TransferFrom),
    )
    .await;
}

/// Stage the source account and offer every other account as the target.
pub(super) async fn choose_from(bot: &Bot, sender: &Sender, account_id: i64) {
    let chat = sender.chat_id;

    let accounts = match bot.ledger.accounts().await {
        Ok(accounts) => accounts,
        Err(error) => return bot.fail(chat, "Loading accounts", error).await,
    };
    let from = match accounts.iter().find(|account| account.id == account_id) {
        Some(from) => from,
        None => return bot.reset_with(chat, messages::ACCOUNT_NOT_FOUND).await,
    };

    let patch = Draft::Transfer(TransferDraft {
        from_account_id: Some(from.id),
        from_account_name: Some(from.name.clone()),
        ..Default::default()
    });

    if bot
        .stage(chat, patch, Step::AddTransferToAccount)
        .await
        .is_some()
    {
        offer_targets(bot, chat, &accounts, account_id).await;
    }
}

async fn offer_targets(bot: &Bot, chat: ChatId, accounts: &[Account], from: i64) {
    bot.offer(
        chat,
        messages::CHOOSE_TO_ACCOUNT,
        &keyboards::accounts(
            accounts.iter().filter(|account| account.id != from),
            CallbackToken::TransferTo,
        ),
    )
    .await;
}

pub(super) async fn choose_to(bot: &Bot, sender: &Sender, account_id: i64) {
    let chat = sender.chat_id;

    let from = match bot.states.get(chat).map(|state| state.draft) {
        Some(Draft::Transfer(TransferDraft {
            from_account_id: Some(from),
            ..
        })) => from,
        _ => return bot.reset_with(chat, messages::START_OVER).await,
    };

    let accounts = match bot.ledger.accounts().await {
        Ok(accounts) => accounts,
        Err(error) => return bot.fail(chat, "Loading accounts", error).await,
    };

    if account_id == from {
        bot.say(chat, messages::SAME_ACCOUNT).await;
        return offer_targets(bot, chat, &accounts, from).await;
    }

    let to = match accounts.iter().find(|account| account.id == account_id) {
        Some(to) => to,
        None => return bot.reset_with(chat, messages::ACCOUNT_NOT_FOUND).await,
    };

    let patch = Draft::Transfer(TransferDraft {
        to_account_id: Some(to.id),
        to_account_name: Some(to.name.clone()),
        ..Default::default()
    });

    if bot
        .stage(chat, patch, Step::AddTransferAmount)
        .await
        .is_some()
    {
        bot.say(chat, messages::ENTER_TRANSFER_AMOUNT).await;
    }
}

pub(super) async fn enter_amount(bot: &Bot, sender: &Sender, text: &str) {
    let chat = sender.chat_id;

    let amount = match extract_amount(text) {
        Some(amount) => amount,
        None => return bot.say(chat, messages::INVALID_AMOUNT).await,
    };

    let patch = Draft::Transfer(TransferDraft {
        amount: Some(amount),
        ..Default::default()
    });

    if let Some(state) = bot.stage(chat, patch, Step::AddTransferConfirm).await {
        bot.show_confirmation(chat, &state).await;
    }
}

pub(super) async fn commit(bot: &Bot, sender: &Sender, draft: TransferDraft) {
    let chat = sender.chat_id;

    let (from_account_id, to_account_id, amount) =
        match (draft.from_account_id, draft.to_account_id, draft.amount) {
            (Some(from), Some(to), Some(amount)) => (from, to, amount),
            _ => return bot.reset_with(chat, messages::START_OVER).await,
        };

    let request = TransferRequest {
        from_account_id,
        to_account_id,
        amount,
        comment: draft.comment.unwrap_or_default(),
        author: Author {
            user_id: sender.user_id,
            display_name: sender.display_name.clone(),
        },
    };

    let result = bot.ledger.transfer(request).await;
    bot.states.reset(chat);

    match result {
        Ok((debit, credit)) => {
            bot.broadcast(&messages::transfer_added(
                &sender.display_name,
                amount,
                &debit,
                &credit,
            ))
            .await;
            bot.offer(chat, messages::CHOOSE_ACTION, &keyboards::main_menu())
                .await;
        }
        Err(error) => {
            warn!(?error, %chat, "Transfer was not completed.");
            if let TransferError::CreditFailed { debit, .. } = &error {
                warn!(account = %debit.account_name, "Debit half of the transfer stays recorded.");
            }
            bot.offer(
                chat,
                &messages::failure("Transfer", &error),
                &keyboards::main_menu(),
            )
            .await;
        }
    }
}
