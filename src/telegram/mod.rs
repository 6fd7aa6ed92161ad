//! The Telegram side of the bot: inbound update payloads and outbound calls.

pub mod clients;
#[cfg(test)]
pub mod recording;
pub mod types;
