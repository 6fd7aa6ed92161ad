//! The per-user conversation state machine.

pub mod callbacks;
pub mod commands;
pub mod confirm;
pub mod input;
pub mod manager;
pub mod state;

pub use manager::{StateManager, StateUpdate};
pub use state::{Draft, Flow, Step, UserState};
