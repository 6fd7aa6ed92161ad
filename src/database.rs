use std::{ops::Deref, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// A pooled connection to the ledger database.
#[derive(Clone)]
pub struct PostgresConnection(PgPool);

impl PostgresConnection {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }

    /// Open a pool against the database.
    ///
    /// # Arguments
    ///
    /// * `url` - Connection string for the database.
    /// * `max_connections` - The size of the pool.
    /// * `timeout_seconds` - How long to wait for a free connection.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        timeout_seconds: u8,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_seconds.into()))
            .connect(url)
            .await
            .context("Failed to connect to the database.")?;

        Ok(Self::new(pool))
    }
}

impl Deref for PostgresConnection {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
