//! Cache client abstraction used by the connectivity check.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::Result;

pub mod memory;
pub mod redis_client;

pub use self::memory::MemoryCache;
pub use self::redis_client::RedisConnector;

/// Where the cache server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

/// Opens connections to a cache server
#[async_trait]
pub trait CacheConnector: Send + Sync {
    /// Connect to `endpoint`, giving up after `timeout`
    async fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn CacheConnection>>;
}

/// An established cache connection
#[async_trait]
pub trait CacheConnection: Send {
    /// Version string reported by the server
    async fn server_version(&mut self) -> Result<String>;

    /// Store `value` under `key`, expiring after `ttl_secs`
    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Read `key`, `None` when absent
    async fn get(&mut self, key: &str) -> Result<Option<String>>;
}
