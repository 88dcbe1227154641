//! Runtime capability probing (PHP extensions).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::host::WpCli;
use crate::Result;

/// Runtime capabilities the diagnostic cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Redis client extension (phpredis)
    RedisClient,
    /// Fast serializer used by the object cache (igbinary)
    FastSerialization,
}

impl Capability {
    /// PHP extension name
    pub fn extension(&self) -> &'static str {
        match self {
            Capability::RedisClient => "redis",
            Capability::FastSerialization => "igbinary",
        }
    }
}

/// Result of a single probe: the version of each loaded extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CapabilitySnapshot {
    #[serde(default, rename = "redis")]
    pub redis_client: Option<String>,

    #[serde(default, rename = "igbinary")]
    pub fast_serialization: Option<String>,
}

impl CapabilitySnapshot {
    pub fn version(&self, capability: Capability) -> Option<&str> {
        match capability {
            Capability::RedisClient => self.redis_client.as_deref(),
            Capability::FastSerialization => self.fast_serialization.as_deref(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.version(capability).is_some()
    }
}

/// Reports which capabilities the runtime provides
#[async_trait]
pub trait CapabilityProbe: Send + Sync {
    async fn probe(&self) -> Result<CapabilitySnapshot>;
}

/// Asks the site's PHP runtime which extensions are loaded
#[derive(Debug, Clone)]
pub struct PhpExtensionProbe {
    cli: WpCli,
}

impl PhpExtensionProbe {
    pub fn new(cli: WpCli) -> Self {
        Self { cli }
    }
}

fn probe_snippet() -> String {
    let entries: Vec<String> = [Capability::RedisClient, Capability::FastSerialization]
        .iter()
        .map(|c| {
            format!(
                "'{ext}' => extension_loaded('{ext}') ? (string) phpversion('{ext}') : null",
                ext = c.extension()
            )
        })
        .collect();
    format!("echo json_encode([{}]);", entries.join(", "))
}

#[async_trait]
impl CapabilityProbe for PhpExtensionProbe {
    async fn probe(&self) -> Result<CapabilitySnapshot> {
        let output = self.cli.eval_payload(&probe_snippet()).await?;
        let snapshot: CapabilitySnapshot = serde_json::from_str(&output)?;
        debug!("Probed extensions: {:?}", snapshot);
        Ok(snapshot)
    }
}
