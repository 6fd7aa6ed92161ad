use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;
use teloxide::{ApiError, RequestError};

use super::{
    clients::{Keyboard, Messenger, MessengerError},
    types::ChatId,
};

/// Something the bot sent.
#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Text {
        chat: ChatId,
        text: String,
    },
    Options {
        chat: ChatId,
        text: String,
        keyboard: Keyboard,
    },
    Acknowledgement(String),
}

impl Sent {
    pub fn chat(&self) -> Option<ChatId> {
        match self {
            Self::Text { chat, .. } | Self::Options { chat, .. } => Some(*chat),
            Self::Acknowledgement(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } | Self::Options { text, .. } => Some(text),
            Self::Acknowledgement(_) => None,
        }
    }
}

/// A [`Messenger`] that remembers everything instead of sending it.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    unreachable: Mutex<HashSet<ChatId>>,
}

impl RecordingMessenger {
    /// Make every message to the chat fail as if the user blocked the bot.
    pub fn make_unreachable(&self, chat: ChatId) {
        self.unreachable.lock().unwrap().insert(chat);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// The texts sent to a chat, oldest first.
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .iter()
            .filter(|sent| sent.chat() == Some(chat))
            .filter_map(|sent| sent.text().map(str::to_owned))
            .collect()
    }

    pub fn last_text_to(&self, chat: ChatId) -> Option<String> {
        self.texts_to(chat).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn check(&self, chat: ChatId) -> Result<(), MessengerError> {
        if self.unreachable.lock().unwrap().contains(&chat) {
            Err(MessengerError::Transport(RequestError::Api(
                ApiError::BotBlocked,
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), MessengerError> {
        self.check(chat)?;
        self.sent.lock().unwrap().push(Sent::Text {
            chat,
            text: text.to_owned(),
        });

        Ok(())
    }

    async fn send_options(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), MessengerError> {
        self.check(chat)?;
        self.sent.lock().unwrap().push(Sent::Options {
            chat,
            text: text.to_owned(),
            keyboard: keyboard.clone(),
        });

        Ok(())
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), MessengerError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Acknowledgement(callback_id.to_owned()));

        Ok(())
    }
}
