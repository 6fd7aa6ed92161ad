use std::{borrow::Cow, net::SocketAddr};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::server;

mod migrate;

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// DSN to tell Sentry where to send events.
    ///
    /// If provided, errors will be sent to Sentry.
    #[clap(long = "sentry-dsn", env = "SENTRY_DSN")]
    sentry_dsn: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    Migrate(MigrateOpts),
    Serve(ServeOpts),
}

#[derive(Args)]
struct MigrateOpts {
    /// Connection string for the database.
    #[clap(long = "database-url", env = "DATABASE_URL")]
    database_url: String,
}

impl From<MigrateOpts> for migrate::MigrationOpts {
    fn from(opts: MigrateOpts) -> Self {
        Self {
            database_url: opts.database_url,
        }
    }
}

#[derive(Args)]
struct ServeOpts {
    /// The socket address to listen for webhook calls on.
    #[clap(long = "bind-address", default_value = "0.0.0.0:8000", env = "BIND_ADDRESS")]
    bind_address: SocketAddr,

    /// The number of connections to use for the database pool.
    #[clap(long = "database-pool-size", default_value = "16")]
    database_pool_size: u32,

    /// The number of seconds before a database connection times out.
    #[clap(long = "database-timeout", default_value = "5")]
    database_timeout: u8,

    /// Connection string for the ledger database.
    #[clap(long = "database-url", env = "DATABASE_URL")]
    database_url: String,

    /// Connection string for Redis.
    ///
    /// If this is not set, conversations are kept in memory and lost on
    /// restart.
    #[clap(long = "redis-url", env = "REDIS_URL")]
    redis_url: Option<String>,

    /// The number of idle seconds after which a conversation is forgotten.
    #[clap(long = "session-ttl", default_value = "300", env = "SESSION_TTL")]
    session_ttl: u64,

    /// Token for the Telegram Bot API.
    ///
    /// If this is not set, outgoing messages are printed to stdout.
    #[clap(long = "bot-token", env = "BOT_TOKEN")]
    bot_token: Option<String>,

    /// Base URL of the Telegram Bot API.
    #[clap(
        long = "telegram-api-url",
        default_value = "https://api.telegram.org",
        env = "TELEGRAM_API_URL"
    )]
    telegram_api_url: String,

    /// Chat IDs allowed to use the bot, separated by commas.
    #[clap(
        long = "allowed-users",
        env = "ALLOWED_USERS",
        value_delimiter = ',',
        required = true
    )]
    allowed_users: Vec<i64>,

    /// Chat to notify when a message cannot be delivered.
    #[clap(long = "admin-chat-id", env = "ADMIN_CHAT_ID")]
    admin_chat_id: Option<i64>,

    /// Secret Telegram must send in the `X-Telegram-Bot-Api-Secret-Token`
    /// header.
    ///
    /// Set the same value as `secret_token` when registering the webhook.
    #[clap(long = "webhook-secret", env = "WEBHOOK_SECRET")]
    webhook_secret: Option<String>,

    /// Currency label used in statistics.
    #[clap(long = "currency-label", default_value = "BYN", env = "CURRENCY_LABEL")]
    currency_label: String,
}

impl From<ServeOpts> for server::Options {
    fn from(opts: ServeOpts) -> Self {
        Self {
            bind_address: opts.bind_address,
            database_pool_size: opts.database_pool_size,
            database_timeout_seconds: opts.database_timeout,
            database_url: opts.database_url,
            redis_url: opts.redis_url,
            session_ttl_seconds: opts.session_ttl,
            bot_token: opts.bot_token,
            telegram_api_url: opts.telegram_api_url,
            webhook_secret: opts.webhook_secret,
            allowed_users: opts.allowed_users,
            admin_chat_id: opts.admin_chat_id,
            currency_label: opts.currency_label,
        }
    }
}

pub async fn run_with_sys_args() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;

    let cli = Cli::parse();

    let sentry_config = cli.sentry_dsn.map(|dsn| {
        debug!("Enabled sentry.");

        let release_name = option_env!("GIT_SHA")
            .map(Cow::from)
            .or_else(|| sentry::release_name!());

        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: release_name,
                ..Default::default()
            },
        ))
    });

    let sentry_tracing_layer = if sentry_config.is_some() {
        Some(sentry_tracing::layer())
    } else {
        None
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(sentry_tracing_layer)
        .init();

    match cli.command {
        Commands::Migrate(opts) => Ok(migrate::run_migrations(opts.into()).await?),
        Commands::Serve(opts) => {
            let migrate_opts = MigrateOpts {
                database_url: opts.database_url.clone(),
            };

            migrate::run_migrations(migrate_opts.into()).await?;

            server::serve(opts.into()).await
        }
    }
}
