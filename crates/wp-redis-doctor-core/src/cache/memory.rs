//! In-memory cache for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{CacheConnection, CacheConnector, Endpoint};
use crate::error::CacheError;
use crate::Result;

#[derive(Debug, Default)]
struct Store {
    entries: HashMap<String, (String, Instant)>,
}

/// In-process stand-in for a Redis server.
///
/// Clones share the same store, so a test can keep a handle and inspect
/// what the diagnostic wrote.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<Mutex<Store>>,
    version: String,
    reachable: bool,
    connects: Arc<AtomicUsize>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            version: "7.2.4".to_string(),
            reachable: true,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report `version` as the server version
    pub fn with_server_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Refuse every connection attempt
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Number of connection attempts seen so far
    pub fn connect_attempts(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Live (unexpired) keys
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let store = self.store.lock();
        store
            .entries
            .iter()
            .filter(|(_, (_, expires))| *expires > now)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Remaining time to live of `key`
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let store = self.store.lock();
        store
            .entries
            .get(key)
            .map(|(_, expires)| expires.saturating_duration_since(Instant::now()))
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheConnector for MemoryCache {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        _timeout: Duration,
    ) -> Result<Box<dyn CacheConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if !self.reachable {
            return Err(CacheError::ConnectFailed {
                endpoint: endpoint.to_string(),
                message: "Connection refused".to_string(),
            }
            .into());
        }

        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl CacheConnection for MemoryCache {
    async fn server_version(&mut self) -> Result<String> {
        Ok(self.version.clone())
    }

    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.store
            .lock()
            .entries
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let mut store = self.store.lock();
        match store.entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                store.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
