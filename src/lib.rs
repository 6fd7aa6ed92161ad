pub mod bot;
pub mod cli;
pub mod conversation;
pub mod database;
mod http_err;
pub mod ledger;
mod models;
pub mod repos;
pub mod server;
pub mod sessions;
pub mod telegram;
pub mod webhook;
