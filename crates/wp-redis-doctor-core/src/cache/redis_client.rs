//! Redis implementation of the cache client.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, InfoDict, RedisConnectionInfo};
use std::time::Duration;
use tracing::debug;

use super::{CacheConnection, CacheConnector, Endpoint};
use crate::error::CacheError;
use crate::{Error, Result};

/// Connects to a Redis server over TCP or a unix socket
#[derive(Debug, Clone, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        Self
    }
}

fn connection_info(endpoint: &Endpoint) -> Result<ConnectionInfo> {
    let addr = match endpoint {
        Endpoint::Tcp { host, port } => ConnectionAddr::Tcp(host.clone(), *port),
        #[cfg(unix)]
        Endpoint::Unix(path) => ConnectionAddr::Unix(path.clone()),
        #[cfg(not(unix))]
        Endpoint::Unix(path) => {
            return Err(Error::Config(format!(
                "Unix sockets are not supported on this platform: {}",
                path.display()
            )))
        }
    };

    Ok(ConnectionInfo {
        addr,
        redis: RedisConnectionInfo::default(),
    })
}

#[async_trait]
impl CacheConnector for RedisConnector {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn CacheConnection>> {
        let client = Client::open(connection_info(endpoint)?).map_err(|e| {
            CacheError::ConnectFailed {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!("Connecting to Redis at {} (timeout {:?})", endpoint, timeout);

        let conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| CacheError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| CacheError::ConnectFailed {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        debug!("Connected to Redis at {}", endpoint);
        Ok(Box::new(RedisConnection { conn }))
    }
}

struct RedisConnection {
    conn: MultiplexedConnection,
}

fn redis_version(info: &InfoDict) -> Result<String> {
    info.get::<String>("redis_version").ok_or_else(|| {
        Error::Cache(CacheError::Command(
            "INFO response has no redis_version".to_string(),
        ))
    })
}

#[async_trait]
impl CacheConnection for RedisConnection {
    async fn server_version(&mut self) -> Result<String> {
        let info: InfoDict = redis::cmd("INFO")
            .arg("server")
            .query_async(&mut self.conn)
            .await?;
        redis_version(&info)
    }

    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.conn.get(key).await?;
        Ok(value)
    }
}
