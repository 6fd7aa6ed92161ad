use anyhow::Context;
use tracing::info;

use crate::database::PostgresConnection;

pub struct MigrationOpts {
    pub database_url: String,
}

/// Apply every migration under `migrations/` that has not run yet.
pub async fn run_migrations(opts: MigrationOpts) -> anyhow::Result<()> {
    let db = PostgresConnection::connect(&opts.database_url, 1, 5).await?;

    sqlx::migrate!("./migrations")
        .run(&*db)
        .await
        .context("Failed to run migrations.")?;

    info!("Database is up to date.");

    Ok(())
}
