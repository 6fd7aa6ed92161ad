use teloxide::types::{CallbackQuery, Message, Update, UpdateKind, User};

pub use teloxide::types::ChatId;

/// Who an update came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Sender {
    pub chat_id: ChatId,
    pub user_id: i64,
    pub display_name: String,
}

impl Sender {
    fn from_user(chat_id: ChatId, user: &User) -> Self {
        Self {
            chat_id,
            user_id: user.id.0 as i64,
            display_name: user.full_name(),
        }
    }
}

/// An update classified by its shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    Text {
        sender: Sender,
        text: String,
    },
    Callback {
        sender: Sender,
        callback_id: String,
        data: String,
    },
    /// Anything else, such as stickers, edits or channel posts.
    Ignored,
}

impl Inbound {
    fn from_callback(query: CallbackQuery) -> Self {
        // Without the originating message there is no chat to answer in, so
        // fall back to the sender's private chat.
        let chat_id = query
            .message
            .as_ref()
            .map(|message| message.chat().id)
            .unwrap_or(ChatId(query.from.id.0 as i64));

        Self::Callback {
            sender: Sender::from_user(chat_id, &query.from),
            callback_id: query.id.to_string(),
            data: query.data.unwrap_or_default(),
        }
    }

    fn from_message(message: Message) -> Self {
        let text = match message.text() {
            Some(text) => text.to_owned(),
            None => return Self::Ignored,
        };

        let chat = &message.chat;
        let sender = match &message.from {
            Some(user) => Sender::from_user(chat.id, user),
            None => Sender {
                chat_id: chat.id,
                user_id: chat.id.0,
                display_name: chat
                    .first_name()
                    .or_else(|| chat.username())
                    .map(str::to_owned)
                    .unwrap_or_else(|| chat.id.to_string()),
            },
        };

        Self::Text { sender, text }
    }
}

impl From<Update> for Inbound {
    fn from(update: Update) -> Self {
        match update.kind {
            UpdateKind::Message(message) => Self::from_message(message),
            UpdateKind::CallbackQuery(query) => Self::from_callback(query),
            _ => Self::Ignored,
        }
    }
}
