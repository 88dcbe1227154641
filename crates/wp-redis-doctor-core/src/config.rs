//! Configuration names, defaults and PHP value semantics.
//!
//! The host exposes WordPress constants as JSON values. Checks interpret
//! them the way PHP would (truthiness, `echo` rendering), so a constant
//! defined as `'0'` reads as disabled just like it does inside WordPress.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::cache::Endpoint;
use crate::{Error, Result};

/// Redis host constant
pub const WP_REDIS_HOST: &str = "WP_REDIS_HOST";
/// Redis port constant
pub const WP_REDIS_PORT: &str = "WP_REDIS_PORT";
/// Kill switch constant
pub const WP_REDIS_DISABLED: &str = "WP_REDIS_DISABLED";
/// Structured Object Cache Pro configuration
pub const WP_REDIS_CONFIG: &str = "WP_REDIS_CONFIG";
/// Plugins directory
pub const WP_PLUGIN_DIR: &str = "WP_PLUGIN_DIR";
/// Content directory
pub const WP_CONTENT_DIR: &str = "WP_CONTENT_DIR";

pub const DEFAULT_REDIS_HOST: &str = "redis";
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Rendered in place of an absent `WP_REDIS_CONFIG` field
pub const NOT_SET: &str = "not set";

/// Tunables for a diagnostic run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Plugin identifier as WordPress knows it (`<dir>/<main file>`)
    pub plugin_id: String,

    /// Text that marks the drop-in as shipped by the plugin
    pub dropin_signature: String,

    /// Deadline for establishing the Redis connection
    pub connect_timeout: Duration,

    /// Expiry of the round-trip test record (seconds)
    pub test_ttl_secs: u64,

    /// Prefix of the round-trip test key
    pub test_key_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plugin_id: "object-cache-pro/object-cache-pro.php".to_string(),
            dropin_signature: "Object Cache Pro".to_string(),
            connect_timeout: Duration::from_millis(500),
            test_ttl_secs: 60,
            test_key_prefix: "wp_redis_test_".to_string(),
        }
    }
}

impl Settings {
    /// Directory name of the plugin inside the plugins directory
    pub fn plugin_slug(&self) -> &str {
        self.plugin_id
            .split_once('/')
            .map(|(slug, _)| slug)
            .unwrap_or(&self.plugin_id)
    }
}

/// The `WP_REDIS_CONFIG` structure.
///
/// Only the fields the diagnostic prints are modelled; everything else the
/// plugin accepts is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub host: Option<Value>,

    #[serde(default)]
    pub port: Option<Value>,

    #[serde(default)]
    pub database: Option<Value>,
}

impl RedisConfig {
    /// Parse the constant's value. Non-object values yield an empty config,
    /// mirroring PHP where indexing a scalar gives `null`.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(serde_json::from_value(value.clone())?),
            _ => Ok(Self::default()),
        }
    }

    pub fn host_display(&self) -> String {
        display_or_not_set(self.host.as_ref())
    }

    pub fn port_display(&self) -> String {
        display_or_not_set(self.port.as_ref())
    }

    pub fn database_display(&self) -> String {
        display_or_not_set(self.database.as_ref())
    }
}

fn display_or_not_set(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_SET.to_string(),
        Some(v) => php_display(v),
    }
}

/// PHP truthiness of a constant value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// How PHP's `echo` renders a value
pub fn php_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => "Array".to_string(),
    }
}

/// Resolve the Redis endpoint from `WP_REDIS_HOST` / `WP_REDIS_PORT`,
/// falling back to `redis:6379`.
pub fn resolve_endpoint(host: Option<&Value>, port: Option<&Value>) -> Result<Endpoint> {
    let host = match host {
        Some(Value::String(s)) => s.clone(),
        Some(other) => php_display(other),
        None => DEFAULT_REDIS_HOST.to_string(),
    };

    let port = match port {
        None => DEFAULT_REDIS_PORT,
        Some(value) => parse_port(value)?,
    };

    if let Some(path) = host.strip_prefix("unix://") {
        return Ok(Endpoint::Unix(path.into()));
    }
    if host.starts_with('/') {
        return Ok(Endpoint::Unix(host.into()));
    }

    Ok(Endpoint::Tcp { host, port })
}

fn parse_port(value: &Value) -> Result<u16> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|p| u16::try_from(p).ok())
        .ok_or_else(|| Error::Config(format!("Invalid {}: {}", WP_REDIS_PORT, value)))
}
