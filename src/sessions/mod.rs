mod memory;
mod redis;

use std::{sync::Arc, time::Duration};

use thiserror::Error;

pub use self::{memory::MemorySessionStore, redis::RedisSessionStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store is unavailable: {0}")]
    Unavailable(#[from] ::redis::RedisError),
}

pub type DynSessionStore = Arc<dyn SessionStore>;

/// A time-limited key-value store for serialized conversation state.
///
/// Entries disappear on their own once their time to live has passed. A read
/// of an expired entry behaves exactly like a read of a key that was never
/// written.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under a key.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the key is absent or expired.
    fn load(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Store a value, replacing any previous one and restarting its expiry
    /// window.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to store the value under.
    /// * `value` - The serialized state.
    /// * `ttl` - How long the entry stays readable without being written again.
    fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError>;

    /// Delete the value stored under a key, if any.
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}
