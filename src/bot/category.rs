//! Adding a category.

use semval::ValidatedFrom;
use tracing::warn;

use crate::{
    conversation::{
        input::{Emoji, Name},
        state::CategoryDraft,
        Draft, Step,
    },
    ledger::domain::categories::{CategoryKind, NewCategory},
    repos::PersistenceError,
    telegram::types::Sender,
};

use super::{keyboards, messages, Bot};

pub(super) async fn start(bot: &Bot, sender: &Sender) {
    bot.states.set(
        sender.chat_id,
        Step::AddCategoryName,
        Draft::Category(CategoryDraft::default()),
    );
    bot.say(sender.chat_id, messages::ENTER_CATEGORY_NAME).await;
}

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

    let patch = Draft::Category(CategoryDraft {
        name: Some(name),
        ..Default::default()
    });

    if bot.stage(chat, patch, Step::AddCategoryType).await.is_some() {
        bot.offer(
            chat,
            messages::CHOOSE_CATEGORY_TYPE,
            &keyboards::category_types(),
        )
        .await;
    }
}

/// Stage the type unless the name is already taken for it.
pub(super) async fn choose_type(bot: &Bot, sender: &Sender, kind: CategoryKind) {
    let chat = sender.chat_id;

    let name = match bot.states.get(chat).map(|state| state.draft) {
        Some(Draft::Category(CategoryDraft {
            name: Some(name), ..
        })) => name,
        _ => return bot.reset_with(chat, messages::START_OVER).await,
    };

    match bot.ledger.category_exists(&name, kind).await {
        Ok(true) => {
            return bot
                .offer(
                    chat,
                    &messages::duplicate_category(&name, kind),
                    &keyboards::category_types(),
                )
                .await
        }
        Ok(false) => (),
        Err(error) => return bot.fail(chat, "Checking the category", error).await,
    }

    let patch = Draft::Category(CategoryDraft {
        kind: Some(kind),
        ..Default::default()
    });

    if bot.stage(chat, patch, Step::AddCategoryEmoji).await.is_some() {
        bot.say(chat, messages::ENTER_EMOJI).await;
    }
}

pub(super) async fn enter_emoji(bot: &Bot, sender: &Sender, text: &str) {
    let chat = sender.chat_id;

    let emoji = match Emoji::validated_from(text) {
        Ok(emoji) => emoji.into_inner(),
        Err(_) => return bot.say(chat, messages::EMPTY_EMOJI).await,
    };

    let patch = Draft::Category(CategoryDraft {
        emoji: Some(emoji),
        ..Default::default()
    });

    if let Some(state) = bot.stage(chat, patch, Step::AddCategoryConfirm).await {
        bot.show_confirmation(chat, &state).await;
    }
}

pub(super) async fn commit(bot: &Bot, sender: &Sender, draft: CategoryDraft) {
    let chat = sender.chat_id;

    let category = match (draft.name, draft.kind, draft.emoji) {
        (Some(name), Some(kind), Some(emoji)) => NewCategory {
            name,
            kind,
            emoji,
            comment: draft.comment.unwrap_or_default(),
        },
        _ => return bot.reset_with(chat, messages::START_OVER).await,
    };

    let result = bot.ledger.add_category(category).await;
    bot.states.reset(chat);

    match result {
        Ok(category) => {
            bot.broadcast(&messages::category_added(&sender.display_name, &category))
                .await;
            bot.offer(chat, messages::CHOOSE_ACTION, &keyboards::main_menu())
                .await;
        }
        Err(PersistenceError::DuplicateCategory { name, kind }) => {
            bot.offer(
                chat,
                &messages::duplicate_category(&name, kind),
                &keyboards::main_menu(),
            )
            .await;
        }
        Err(error) => {
            warn!(?error, %chat, "Category was not added.");
            bot.offer(
                chat,
                &messages::failure("Adding the category", &error),
                &keyboards::main_menu(),
            )
            .await;
        }
    }
}
