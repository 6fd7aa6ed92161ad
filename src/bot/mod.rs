//! Routes updates to the flows and keeps the conversation moving.
//!
//! No error escapes an entry point of this module. Every failure is logged,
//! reported to the user and followed by a reset to [`Step::Default`].

mod account;
mod category;
mod keyboards;
mod messages;
mod reports;
mod transaction;
mod transfer;

use std::sync::Arc;

use teloxide::types::Update;
use tracing::{debug, error, info, warn};

use crate::{
    conversation::{
        callbacks::CallbackToken,
        commands::Command,
        confirm::{self, ConfirmAction, Decision},
        Draft, Flow, StateManager, StateUpdate, Step, UserState,
    },
    ledger::{domain::transactions::TransactionKind, services::LedgerService},
    telegram::{
        clients::{Keyboard, Messenger, MessengerError},
        types::{ChatId, Inbound, Sender},
    },
};

pub type DynMessenger = Arc<dyn Messenger>;

/// Who may talk to the bot, and who hears about delivery problems.
#[derive(Clone, Debug)]
pub struct Access {
    allowed: Vec<ChatId>,
    operator: Option<ChatId>,
}

impl Access {
    /// # Arguments
    ///
    /// * `allowed` - The chats allowed to use the bot. Success notices are
    ///   broadcast to all of them.
    /// * `operator` - A chat told about failed outbound messages.
    pub fn new(allowed: impl IntoIterator<Item = ChatId>, operator: Option<ChatId>) -> Self {
        let mut unique = Vec::new();
        for chat in allowed {
            if !unique.contains(&chat) {
                unique.push(chat);
            }
        }

        Self {
            allowed: unique,
            operator,
        }
    }

    pub fn allows(&self, chat: ChatId) -> bool {
        self.allowed.contains(&chat)
    }
}

/// The conversational front end of the ledger.
pub struct Bot {
    access: Access,
    currency_label: String,
    ledger: LedgerService,
    messenger: DynMessenger,
    states: StateManager,
}

impl Bot {
    /// Create a new bot.
    ///
    /// # Arguments
    ///
    /// * `access` - The allow-list and operator chat.
    /// * `currency_label` - The currency named in statistics.
    /// * `ledger` - Where categories, accounts and transactions live.
    /// * `messenger` - How the bot talks back.
    /// * `states` - Where conversations are kept between updates.
    pub fn new(
        access: Access,
        currency_label: String,
        ledger: LedgerService,
        messenger: DynMessenger,
        states: StateManager,
    ) -> Self {
        Self {
            access,
            currency_label,
            ledger,
            messenger,
            states,
        }
    }

    /// Process one update to completion.
    pub async fn handle_update(&self, update: Update) {
        let update_id = update.id;

        match Inbound::from(update) {
            Inbound::Text { sender, text } => self.handle_text(&sender, &text).await,
            Inbound::Callback {
                sender,
                callback_id,
                data,
            } => self.handle_callback(&sender, &callback_id, &data).await,
            Inbound::Ignored => debug!(?update_id, "Ignoring update without text or callback."),
        }
    }

    async fn handle_text(&self, sender: &Sender, text: &str) {
        let chat = sender.chat_id;

        if !self.access.allows(chat) {
            warn!(%chat, "Rejected message from unknown chat.");
            self.say(chat, messages::ACCESS_DENIED).await;
            return;
        }

        if let Some(command) = Command::parse(text) {
            self.run_command(sender, command).await;
            return;
        }

        match self.states.current_step(chat) {
            Step::AddTransactionAmount => transaction::enter_amount(self, sender, text).await,
            Step::AddCategoryName => category::enter_name(self, sender, text).await,
            Step::AddCategoryEmoji => category::enter_emoji(self, sender, text).await,
            Step::AddAccountName => account::enter_name(self, sender, text).await,
            Step::AddAccountCurrency => account::enter_currency(self, sender, text).await,
            Step::AddAccountAmount => account::enter_amount(self, sender, text).await,
            Step::AddTransferAmount => transfer::enter_amount(self, sender, text).await,
            step @ (Step::AddTransactionComment
            | Step::AddCategoryComment
            | Step::AddAccountComment
            | Step::AddTransferComment) => {
                if let Some(flow) = step.flow() {
                    self.enter_comment(sender, flow, text).await
                }
            }
            step => {
                debug!(%chat, ?step, "Text does not fit the current step.");
                self.reset_with(chat, messages::UNKNOWN_COMMAND).await;
            }
        }
    }

    async fn handle_callback(&self, sender: &Sender, callback_id: &str, data: &str) {
        let chat = sender.chat_id;

        if let Err(error) = self.messenger.acknowledge_callback(callback_id).await {
            self.report_transport(chat, error).await;
        }

        if !self.access.allows(chat) {
            warn!(%chat, "Rejected callback from unknown chat.");
            self.say(chat, messages::ACCESS_DENIED).await;
            return;
        }

        let token = match data.parse::<CallbackToken>() {
            Ok(token) => token,
            Err(error) => {
                warn!(?error, %chat, "Failed to decode callback data.");
                self.reset_with(chat, messages::UNKNOWN_CALLBACK).await;
                return;
            }
        };

        match (self.states.current_step(chat), token) {
            (Step::AddTransactionType, CallbackToken::TransactionType(kind)) => {
                transaction::choose_type(self, sender, kind).await
            }
            (Step::AddTransactionAccount, CallbackToken::Account(id)) => {
                transaction::choose_account(self, sender, id).await
            }
            (Step::AddTransactionCategory, CallbackToken::Category(id)) => {
                transaction::choose_category(self, sender, id).await
            }
            (Step::AddCategoryType, CallbackToken::CategoryType(kind)) => {
                category::choose_type(self, sender, kind).await
            }
            (Step::AddTransferFromAccount, CallbackToken::TransferFrom(id)) => {
                transfer::choose_from(self, sender, id).await
            }
            (Step::AddTransferToAccount, CallbackToken::TransferTo(id)) => {
                transfer::choose_to(self, sender, id).await
            }
            (step, CallbackToken::Decision(action)) if is_confirm_step(step) => {
                if let Some(flow) = step.flow() {
                    self.decide(sender, flow, action).await
                }
            }
            (step, token) => {
                debug!(%chat, ?step, ?token, "Callback does not fit the current step.");
                self.reset_with(chat, messages::UNKNOWN_CALLBACK).await;
            }
        }
    }

    async fn run_command(&self, sender: &Sender, command: Command) {
        let chat = sender.chat_id;
        debug!(%chat, ?command, "Running command.");

        match command {
            Command::Start => {
                self.states.reset(chat);
                self.offer(
                    chat,
                    &messages::greeting(&sender.display_name),
                    &keyboards::main_menu(),
                )
                .await;
            }
            Command::Help => self.say(chat, messages::HELP).await,
            Command::Cancel => {
                self.states.reset(chat);
                self.offer(chat, messages::START_OVER, &keyboards::main_menu())
                    .await;
            }
            Command::AddTransaction => transaction::start(self, sender).await,
            Command::AddIncome => {
                transaction::start_with_kind(self, sender, TransactionKind::Income).await
            }
            Command::AddExpense => {
                transaction::start_with_kind(self, sender, TransactionKind::Expense).await
            }
            Command::AddTransfer => transfer::start(self, sender).await,
            Command::AddCategory => category::start(self, sender).await,
            Command::AddAccount => account::start(self, sender).await,
            Command::Balances => reports::balances(self, chat).await,
            Command::Categories => reports::categories(self, chat).await,
            Command::Stats(period) => reports::stats(self, chat, period).await,
        }
    }

    /// Store a comment for the flow and return to its confirmation.
    async fn enter_comment(&self, sender: &Sender, flow: Flow, text: &str) {
        let patch = Draft::comment_patch(flow, text.trim().to_owned());

        if let Some(state) = self
            .stage(sender.chat_id, patch, flow.confirm_step())
            .await
        {
            self.show_confirmation(sender.chat_id, &state).await;
        }
    }

    /// Apply the answer given at a flow's confirmation step.
    async fn decide(&self, sender: &Sender, flow: Flow, action: ConfirmAction) {
        let chat = sender.chat_id;
        info!(%chat, ?flow, %action, "Confirmation answered.");

        match confirm::decide(flow, action) {
            Decision::Commit => self.commit(sender, flow).await,
            Decision::Discard => {
                self.states.reset(chat);
                self.say(chat, messages::CANCELLED).await;
                self.offer(chat, messages::START_OVER, &keyboards::main_menu())
                    .await;
            }
            Decision::Rewind(step) => {
                if self.advance(chat, step).await.is_none() {
                    return;
                }

                match step {
                    Step::AddTransferFromAccount => transfer::ask_from(self, chat).await,
                    Step::AddTransactionAmount => self.say(chat, messages::ENTER_AMOUNT).await,
                    Step::AddCategoryName => self.say(chat, messages::ENTER_CATEGORY_NAME).await,
                    Step::AddAccountName => self.say(chat, messages::ENTER_ACCOUNT_NAME).await,
                    other => warn!(?other, "No prompt for rewound step."),
                }
            }
            Decision::AwaitComment(step) => {
                if self.advance(chat, step).await.is_some() {
                    self.offer(chat, messages::ENTER_COMMENT, &Keyboard::RemoveReply)
                        .await;
                }
            }
        }
    }

    async fn commit(&self, sender: &Sender, flow: Flow) {
        let chat = sender.chat_id;

        match (flow, self.states.get(chat).map(|state| state.draft)) {
            (Flow::Transaction, Some(Draft::Transaction(draft))) => {
                transaction::commit(self, sender, draft).await
            }
            (Flow::Category, Some(Draft::Category(draft))) => {
                category::commit(self, sender, draft).await
            }
            (Flow::Account, Some(Draft::Account(draft))) => {
                account::commit(self, sender, draft).await
            }
            (Flow::Transfer, Some(Draft::Transfer(draft))) => {
                transfer::commit(self, sender, draft).await
            }
            (flow, draft) => {
                warn!(%chat, ?flow, ?draft, "Nothing staged to commit.");
                self.reset_with(chat, messages::START_OVER).await;
            }
        }
    }

    /// Show the summary of everything staged along with the decision buttons.
    async fn show_confirmation(&self, chat: ChatId, state: &UserState) {
        let summary = match &state.draft {
            Draft::Transaction(draft) => messages::transaction_summary(draft),
            Draft::Category(draft) => messages::category_summary(draft),
            Draft::Account(draft) => messages::account_summary(draft),
            Draft::Transfer(draft) => messages::transfer_summary(draft),
            Draft::Empty => {
                self.reset_with(chat, messages::START_OVER).await;
                return;
            }
        };

        self.offer(chat, &summary, &keyboards::confirmation()).await;
    }

    /// Merge a patch into the staged answers and move to the next step.
    ///
    /// # Returns
    ///
    /// The new state, or [`None`] if the user had no state left and was sent
    /// back to the start instead.
    async fn stage(&self, chat: ChatId, patch: Draft, next: Step) -> Option<UserState> {
        let update = match self.states.update_data(chat, patch) {
            StateUpdate::Updated(_) => self.states.update_step(chat, next),
            recovered => recovered,
        };

        self.settle(chat, update).await
    }

    /// Move to another step without staging anything.
    async fn advance(&self, chat: ChatId, next: Step) -> Option<UserState> {
        let update = self.states.update_step(chat, next);

        self.settle(chat, update).await
    }

    async fn settle(&self, chat: ChatId, update: StateUpdate) -> Option<UserState> {
        match update {
            StateUpdate::Updated(state) => Some(state),
            StateUpdate::RecoveredToDefault => {
                self.offer(chat, messages::START_OVER, &keyboards::main_menu())
                    .await;
                None
            }
        }
    }

    /// Reset the user to [`Step::Default`] and explain why.
    async fn reset_with(&self, chat: ChatId, text: &str) {
        self.states.reset(chat);
        self.offer(chat, text, &keyboards::main_menu()).await;
    }

    /// Log a failed operation, tell the user and reset.
    async fn fail(&self, chat: ChatId, what: &str, error: anyhow::Error) {
        error!(?error, %chat, "{} failed.", what);
        self.reset_with(chat, &messages::failure(what, &error)).await;
    }

    /// Tell every allowed chat about a change to the ledger.
    async fn broadcast(&self, text: &str) {
        for chat in &self.access.allowed {
            self.say(*chat, text).await;
        }
    }

    async fn say(&self, chat: ChatId, text: &str) {
        if let Err(error) = self.messenger.send_text(chat, text).await {
            self.report_transport(chat, error).await;
        }
    }

    async fn offer(&self, chat: ChatId, text: &str, keyboard: &Keyboard) {
        if let Err(error) = self.messenger.send_options(chat, text, keyboard).await {
            self.report_transport(chat, error).await;
        }
    }

    async fn report_transport(&self, chat: ChatId, error: MessengerError) {
        error!(?error, %chat, "Failed to reach chat.");

        let operator = match self.access.operator {
            Some(operator) if operator != chat => operator,
            _ => return,
        };

        let notice = format!("⚠️ Failed to reach chat {}: {}", chat, error);
        if let Err(error) = self.messenger.send_text(operator, &notice).await {
            error!(?error, %operator, "Failed to notify operator.");
        }
    }
}

fn is_confirm_step(step: Step) -> bool {
    step.flow().map(|flow| flow.confirm_step()) == Some(step)
}

#[cfg(test)]
mod test;
