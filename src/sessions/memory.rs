use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use super::{SessionError, SessionStore};

/// An in-process session store, used when no Redis instance is configured.
///
/// State does not survive a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), (value.to_owned(), Instant::now() + ttl));

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stores_and_loads() {
        let store = MemorySessionStore::new();
        store.store("k", "v", Duration::from_secs(60)).unwrap();

        assert_eq!(Some("v".to_owned()), store.load("k").unwrap());
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let store = MemorySessionStore::new();
        store.store("k", "v", Duration::ZERO).unwrap();

        assert_eq!(None, store.load("k").unwrap());
    }

    #[test]
    fn remove_deletes_entry() {
        let store = MemorySessionStore::new();
        store.store("k", "v", Duration::from_secs(60)).unwrap();
        store.remove("k").unwrap();

        assert_eq!(None, store.load("k").unwrap());
    }
}
