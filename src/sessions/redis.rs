use std::time::Duration;

use redis::Commands;

use super::{SessionError, SessionStore};

/// A session store that uses Redis as a backing store.
pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    /// Create a new session store.
    ///
    /// # Arguments
    ///
    /// * `connection_uri` - The connection string used to connect to Redis.
    pub fn new(connection_uri: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: redis::Client::open(connection_uri)?,
        })
    }
}

impl SessionStore for RedisSessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.client.get_connection()?;

        Ok(conn.get(key)?)
    }

    fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError> {
        let mut conn = self.client.get_connection()?;

        // Redis refuses an expiry of zero seconds.
        let seconds = ttl.as_secs().max(1) as usize;
        conn.set_ex::<_, _, ()>(key, value, seconds)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.client.get_connection()?;
        conn.del::<_, ()>(key)?;

        Ok(())
    }
}
