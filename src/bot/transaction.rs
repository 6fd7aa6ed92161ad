//! Adding an income or an expense to an account.

use tracing::warn;

use crate::{
    conversation::{
        callbacks::CallbackToken, input::extract_amount, state::TransactionDraft, Draft, Step,
    },
    ledger::{
        domain::{
            categories::CategoryKind,
            transactions::{Author, TransactionKind},
        },
        services::TransactionRequest,
    },
    telegram::types::Sender,
};

use super::{keyboards, messages, Bot};

/// Ask for the transaction type.
pub(super) async fn start(bot: &Bot, sender: &Sender) {
    let chat = sender.chat_id;

    bot.states.set(
        chat,
        Step::AddTransactionType,
        Draft::Transaction(TransactionDraft::default()),
    );
    bot.offer(
        chat,
        messages::CHOOSE_TRANSACTION_TYPE,
        &keyboards::transaction_types(),
    )
    .await;
}

/// Start with the type already known and go straight to the account.
pub(super) async fn start_with_kind(bot: &Bot, sender: &Sender, kind: TransactionKind) {
    ask_account(bot, sender, kind, true).await
}

pub(super) async fn choose_type(bot: &Bot, sender: &Sender, kind: TransactionKind) {
    ask_account(bot, sender, kind, false).await
}

/// Check there is something to record against, stage the type and offer the
/// accounts.
async fn ask_account(bot: &Bot, sender: &Sender, kind: TransactionKind, fresh: bool) {
    let chat = sender.chat_id;

    let accounts = match bot.ledger.accounts().await {
        Ok(accounts) => accounts,
        Err(error) => return bot.fail(chat, "Loading accounts", error).await,
    };
    if accounts.is_empty() {
        return bot.reset_with(chat, messages::NO_ACCOUNTS).await;
    }

    match bot.ledger.categories(kind.into()).await {
        Ok(categories) if categories.is_empty() => {
            return bot.reset_with(chat, &messages::no_categories(kind)).await
        }
        Ok(_) => (),
        Err(error) => return bot.fail(chat, "Loading categories", error).await,
    }

    let patch = Draft::Transaction(TransactionDraft {
        kind: Some(kind),
        ..Default::default()
    });

    if fresh {
        bot.states.set(chat, Step::AddTransactionAccount, patch);
    } else if bot
        .stage(chat, patch, Step::AddTransactionAccount)
        .await
        .is_none()
    {
        return;
    }

    bot.offer(
        chat,
        messages::CHOOSE_ACCOUNT,
        &keyboards::accounts(&accounts, CallbackToken::Account),
    )
    .await;
}

/// The staged draft, or a reset if it has gone missing.
async fn draft(bot: &Bot, sender: &Sender) -> Option<TransactionDraft> {
    match bot.states.get(sender.chat_id).map(|state| state.draft) {
        Some(Draft::Transaction(draft)) => Some(draft),
        _ => {
            bot.reset_with(sender.chat_id, messages::START_OVER).await;
            None
        }
    }
}

/// Stage the account and offer the categories of the chosen type.
pub(super) async fn choose_account(bot: &Bot, sender: &Sender, account_id: i64) {
    let chat = sender.chat_id;

    let kind = match draft(bot, sender).await {
        Some(TransactionDraft {
            kind: Some(kind), ..
        }) => kind,
        Some(_) => return bot.reset_with(chat, messages::START_OVER).await,
        None => return,
    };

    let account = match bot.ledger.account(account_id).await {
        Ok(Some(account)) => account,
        Ok(None) => return bot.reset_with(chat, messages::ACCOUNT_NOT_FOUND).await,
        Err(error) => return bot.fail(chat, "Loading the account", error).await,
    };

    let categories = match bot.ledger.categories(kind.into()).await {
        Ok(categories) if categories.is_empty() => {
            return bot.reset_with(chat, &messages::no_categories(kind)).await
        }
        Ok(categories) => categories,
        Err(error) => return bot.fail(chat, "Loading categories", error).await,
    };

    let patch = Draft::Transaction(TransactionDraft {
        account_id: Some(account.id),
        account_name: Some(account.name),
        ..Default::default()
    });

    if bot
        .stage(chat, patch, Step::AddTransactionCategory)
        .await
        .is_some()
    {
        bot.offer(
            chat,
            messages::CHOOSE_CATEGORY,
            &keyboards::categories(&categories),
        )
        .await;
    }
}

pub(super) async fn choose_category(bot: &Bot, sender: &Sender, category_id: i64) {
    let chat = sender.chat_id;

    let kind = match draft(bot, sender).await {
        Some(draft) => draft.kind,
        None => return,
    };

    let category = match bot.ledger.category(category_id).await {
        Ok(Some(category)) => category,
        Ok(None) => return bot.reset_with(chat, messages::CATEGORY_NOT_FOUND).await,
        Err(error) => return bot.fail(chat, "Loading the category", error).await,
    };

    // Buttons from an older keyboard may offer a category of the other type.
    if kind.map(CategoryKind::from) != Some(category.kind) {
        warn!(%chat, category_id, "Category does not match the transaction type.");
        return bot.reset_with(chat, messages::UNKNOWN_CALLBACK).await;
    }

    let patch = Draft::Transaction(TransactionDraft {
        category_id: Some(category.id),
        category_name: Some(category.name),
        ..Default::default()
    });

    if bot
        .stage(chat, patch, Step::AddTransactionAmount)
        .await
        .is_some()
    {
        bot.say(chat, messages::ENTER_AMOUNT).await;
    }
}

pub(super) async fn enter_amount(bot: &Bot, sender: &Sender, text: &str) {
    let chat = sender.chat_id;

    let amount = match extract_amount(text) {
        Some(amount) => amount,
        None => return bot.say(chat, messages::INVALID_AMOUNT).await,
    };

    let patch = Draft::Transaction(TransactionDraft {
        amount: Some(amount),
        ..Default::default()
    });

    if let Some(state) = bot.stage(chat, patch, Step::AddTransactionConfirm).await {
        bot.show_confirmation(chat, &state).await;
    }
}

pub(super) async fn commit(bot: &Bot, sender: &Sender, draft: TransactionDraft) {
    let chat = sender.chat_id;

    let (kind, account_id, category_name, amount) =
        match (draft.kind, draft.account_id, draft.category_name, draft.amount) {
            (Some(kind), Some(account_id), Some(category_name), Some(amount)) => {
                (kind, account_id, category_name, amount)
            }
            _ => return bot.reset_with(chat, messages::START_OVER).await,
        };

    let request = TransactionRequest {
        kind,
        amount,
        category_name: category_name.clone(),
        comment: draft.comment.unwrap_or_default(),
        author: Author {
            user_id: sender.user_id,
            display_name: sender.display_name.clone(),
        },
        account_id,
    };

    let result = bot.ledger.record_transaction(request).await;
    bot.states.reset(chat);

    match result {
        Ok(receipt) => {
            bot.broadcast(&messages::transaction_added(
                &sender.display_name,
                kind,
                amount,
                &category_name,
                &receipt,
            ))
            .await;
            bot.offer(chat, messages::CHOOSE_ACTION, &keyboards::main_menu())
                .await;
        }
        Err(error) => {
            warn!(?error, %chat, "Transaction was not added.");
            bot.offer(
                chat,
                &messages::failure("Adding the transaction", &error),
                &keyboards::main_menu(),
            )
            .await;
        }
    }
}
