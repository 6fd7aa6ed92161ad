use std::time::Duration;

use tracing::{debug, error, warn};

use crate::{sessions::DynSessionStore, telegram::types::ChatId};

use super::state::{Draft, Step, UserState};

/// The result of updating an existing state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateUpdate {
    /// The state existed and now holds the change.
    Updated(UserState),

    /// There was no state to update, so the user was reset to
    /// [`Step::Default`] instead. The change was dropped.
    RecoveredToDefault,
}

/// Reads and writes conversation state through the session store.
///
/// Every method is a complete round trip through the store. Store failures
/// are logged and read as "no state", which sends the user back to
/// [`Step::Default`] on their next interaction.
#[derive(Clone)]
pub struct StateManager {
    store: DynSessionStore,
    ttl: Duration,
}

impl StateManager {
    /// Create a new state manager.
    ///
    /// # Arguments
    ///
    /// * `store` - Where states are kept.
    /// * `ttl` - How long a state survives without being written.
    pub fn new(store: DynSessionStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(chat: ChatId) -> String {
        format!("user_state_{}", chat)
    }

    pub fn get(&self, chat: ChatId) -> Option<UserState> {
        let raw = match self.store.load(&Self::key(chat)) {
            Ok(raw) => raw?,
            Err(error) => {
                error!(?error, %chat, "Failed to load user state.");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(error) => {
                warn!(?error, %chat, "Discarding unreadable user state.");
                None
            }
        }
    }

    /// Replace the state unconditionally and restart its expiry window.
    pub fn set(&self, chat: ChatId, step: Step, draft: Draft) -> UserState {
        let state = UserState { step, draft };
        self.write(chat, &state);

        state
    }

    /// Start over at [`Step::Default`] with nothing staged.
    pub fn reset(&self, chat: ChatId) -> UserState {
        self.set(chat, Step::Default, Draft::Empty)
    }

    /// Merge a patch into the staged answers, leaving the step alone.
    pub fn update_data(&self, chat: ChatId, patch: Draft) -> StateUpdate {
        match self.get(chat) {
            Some(state) => {
                let updated = UserState {
                    step: state.step,
                    draft: state.draft.merge(patch),
                };
                self.write(chat, &updated);

                StateUpdate::Updated(updated)
            }
            None => self.recover(chat),
        }
    }

    /// Move to another step, leaving the staged answers alone.
    pub fn update_step(&self, chat: ChatId, step: Step) -> StateUpdate {
        match self.get(chat) {
            Some(state) => {
                let updated = UserState {
                    step,
                    draft: state.draft,
                };
                self.write(chat, &updated);

                StateUpdate::Updated(updated)
            }
            None => self.recover(chat),
        }
    }

    /// Delete the state right away.
    pub fn clear(&self, chat: ChatId) {
        if let Err(error) = self.store.remove(&Self::key(chat)) {
            error!(?error, %chat, "Failed to clear user state.");
        }
    }

    pub fn is_in_step(&self, chat: ChatId, step: Step) -> bool {
        self.current_step(chat) == step
    }

    /// The user's step, [`Step::Default`] when there is no state.
    pub fn current_step(&self, chat: ChatId) -> Step {
        self.get(chat).map(|state| state.step).unwrap_or_default()
    }

    fn recover(&self, chat: ChatId) -> StateUpdate {
        debug!(%chat, "No user state to update, resetting.");
        self.reset(chat);

        StateUpdate::RecoveredToDefault
    }

    fn write(&self, chat: ChatId, state: &UserState) {
        let serialized = match serde_json::to_string(state) {
            Ok(serialized) => serialized,
            Err(error) => {
                error!(?error, %chat, "Failed to serialize user state.");
                return;
            }
        };

        if let Err(error) = self.store.store(&Self::key(chat), &serialized, self.ttl) {
            error!(?error, %chat, "Failed to store user state.");
        }
    }
}
