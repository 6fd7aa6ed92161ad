use anyhow::Context;
use async_trait::async_trait;
use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
        KeyboardRemove, ReplyMarkup,
    },
    RequestError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::conversation::callbacks::CallbackToken;

use super::types::ChatId;

/// A button that answers with a callback token when pressed.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineButton {
    pub label: String,
    pub token: CallbackToken,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, token: CallbackToken) -> Self {
        Self {
            label: label.into(),
            token,
        }
    }
}

/// The options shown along with a message.
#[derive(Clone, Debug, PartialEq)]
pub enum Keyboard {
    /// Buttons attached to the message itself.
    Inline(Vec<Vec<InlineButton>>),
    /// A persistent keyboard replacing the user's regular one. Pressing a
    /// button sends its label as a text message.
    Reply(Vec<Vec<String>>),
    /// Hide a previously shown reply keyboard.
    RemoveReply,
}

impl Keyboard {
    pub fn markup(&self) -> ReplyMarkup {
        match self {
            Self::Inline(rows) => ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(
                rows.iter().map(|row| {
                    row.iter().map(|button| {
                        InlineKeyboardButton::callback(button.label.clone(), button.token.to_string())
                    })
                }),
            )),
            Self::Reply(rows) => ReplyMarkup::Keyboard(
                KeyboardMarkup::new(
                    rows.iter()
                        .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone()))),
                )
                .resize_keyboard(),
            ),
            Self::RemoveReply => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
        }
    }
}

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("request to the Bot API failed: {0}")]
    Transport(#[from] RequestError),
}

/// The outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), MessengerError>;

    async fn send_options(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), MessengerError>;

    /// Tell the platform a button press was received. This has to happen
    /// within a few seconds of the press.
    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), MessengerError>;
}

/// Prints outgoing messages instead of sending them.
pub struct ConsoleMessenger;

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), MessengerError> {
        println!("To: {}", chat);
        println!("{}", "-".repeat(80));
        println!("{}\n", text);

        Ok(())
    }

    async fn send_options(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), MessengerError> {
        println!("To: {}", chat);
        println!("{}", "-".repeat(80));
        println!("{}", text);
        println!("{:?}\n", keyboard.markup());

        Ok(())
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), MessengerError> {
        println!("Acknowledged callback {}\n", callback_id);

        Ok(())
    }
}

/// Talks to the Telegram Bot API.
pub struct TelegramMessenger {
    bot: teloxide::Bot,
}

impl TelegramMessenger {
    /// Create a new messenger.
    ///
    /// # Arguments
    ///
    /// * `api_url` - The Bot API root, eg `https://api.telegram.org`.
    /// * `token` - The bot's token.
    pub fn new(api_url: &str, token: &str) -> anyhow::Result<Self> {
        let api_url = api_url
            .parse::<reqwest::Url>()
            .with_context(|| format!("Invalid Bot API URL: {}", api_url))?;

        Ok(Self {
            bot: teloxide::Bot::new(token).set_api_url(api_url),
        })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), MessengerError> {
        self.bot.send_message(chat, text).await?;
        debug!(%chat, "Sent message.");

        Ok(())
    }

    async fn send_options(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), MessengerError> {
        self.bot
            .send_message(chat, text)
            .reply_markup(keyboard.markup())
            .await?;
        debug!(%chat, "Sent message with options.");

        Ok(())
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), MessengerError> {
        self.bot
            .answer_callback_query(callback_id.to_owned())
            .await?;
        info!(%callback_id, "Acknowledged callback query.");

        Ok(())
    }
}
