use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{extract::FromRef, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    bot::{Access, Bot, DynMessenger},
    conversation::StateManager,
    database::PostgresConnection,
    ledger::services::LedgerService,
    repos::DynLedgerRepo,
    sessions::{DynSessionStore, MemorySessionStore, RedisSessionStore},
    telegram::{
        clients::{ConsoleMessenger, TelegramMessenger},
        types::ChatId,
    },
    webhook::{self, UpdateGate, WebhookSecret},
};

pub struct Options {
    pub bind_address: SocketAddr,

    pub database_pool_size: u32,
    pub database_timeout_seconds: u8,
    pub database_url: String,

    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,

    pub bot_token: Option<String>,
    pub telegram_api_url: String,
    pub webhook_secret: Option<String>,

    pub allowed_users: Vec<i64>,
    pub admin_chat_id: Option<i64>,
    pub currency_label: String,
}

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
    pub gate: UpdateGate,
    pub secret: WebhookSecret,
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let db_connection = PostgresConnection::connect(
        &opts.database_url,
        opts.database_pool_size,
        opts.database_timeout_seconds,
    )
    .await?;
    let ledger_repo: DynLedgerRepo = Arc::new(db_connection);

    let session_store: DynSessionStore = match &opts.redis_url {
        Some(url) => Arc::new(RedisSessionStore::new(url)?),
        None => {
            info!("No Redis URL provided. Conversations will not survive a restart.");

            Arc::new(MemorySessionStore::new())
        }
    };

    let messenger: DynMessenger = match &opts.bot_token {
        Some(token) => Arc::new(TelegramMessenger::new(&opts.telegram_api_url, token)?),
        None => {
            info!("No bot token provided. Messages will be printed to stdout.");

            Arc::new(ConsoleMessenger)
        }
    };

    let bot = Bot::new(
        Access::new(
            opts.allowed_users.into_iter().map(ChatId),
            opts.admin_chat_id.map(ChatId),
        ),
        opts.currency_label,
        LedgerService::new(ledger_repo),
        messenger,
        StateManager::new(
            session_store,
            Duration::from_secs(opts.session_ttl_seconds),
        ),
    );

    let state = AppState {
        bot: Arc::new(bot),
        gate: UpdateGate::default(),
        secret: WebhookSecret(opts.webhook_secret.map(Arc::from)),
    };

    let app = Router::new()
        .merge(webhook::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!(address = %opts.bind_address, "Listening for updates.");

    axum::Server::bind(&opts.bind_address)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

impl FromRef<AppState> for Arc<Bot> {
    fn from_ref(state: &AppState) -> Self {
        state.bot.clone()
    }
}

impl FromRef<AppState> for UpdateGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

impl FromRef<AppState> for WebhookSecret {
    fn from_ref(state: &AppState) -> Self {
        state.secret.clone()
    }
}
