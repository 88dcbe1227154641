//! Test doubles and fixtures.
//!
//! Provides a fake WordPress host, a fixed capability probe, cache
//! connectors with scripted misbehaviour and a temporary site tree.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use wp_redis_doctor_core::cache::{CacheConnection, CacheConnector, Endpoint, MemoryCache};
use wp_redis_doctor_core::error::CacheError;
use wp_redis_doctor_core::probe::{CapabilityProbe, CapabilitySnapshot};
use wp_redis_doctor_core::{Diagnostic, DiagnosticReport, Error, Host, Result};

pub const PLUGIN_ID: &str = "object-cache-pro/object-cache-pro.php";
pub const STUB_CONTENTS: &str = "<?php\n/**\n * Plugin Name: Object Cache Pro (Drop-in)\n */\n";

// ============================================================================
// Site fixture
// ============================================================================

/// A WordPress content tree in a temporary directory
pub struct Site {
    _dir: TempDir,
    pub content_dir: PathBuf,
    pub plugins_dir: PathBuf,
}

impl Site {
    /// Empty `wp-content/plugins`
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let content_dir = dir.path().join("wp-content");
        let plugins_dir = content_dir.join("plugins");
        std::fs::create_dir_all(&plugins_dir).expect("Failed to create plugins dir");

        Self {
            _dir: dir,
            content_dir,
            plugins_dir,
        }
    }

    /// Plugin, stub and authentic drop-in all present
    pub fn healthy() -> Self {
        let site = Self::empty();
        site.install_plugin();
        site.install_stub();
        site.install_dropin(STUB_CONTENTS);
        site
    }

    pub fn plugin_file(&self) -> PathBuf {
        self.plugins_dir.join(PLUGIN_ID)
    }

    pub fn stub_file(&self) -> PathBuf {
        self.plugins_dir
            .join("object-cache-pro")
            .join("stubs")
            .join("object-cache.php")
    }

    pub fn dropin_file(&self) -> PathBuf {
        self.content_dir.join("object-cache.php")
    }

    pub fn install_plugin(&self) {
        write_file(&self.plugin_file(), "<?php\n/* Plugin Name: Object Cache Pro */\n");
    }

    pub fn install_stub(&self) {
        write_file(&self.stub_file(), STUB_CONTENTS);
    }

    pub fn install_dropin(&self, contents: &str) {
        write_file(&self.dropin_file(), contents);
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, contents).expect("Failed to write file");
}

// ============================================================================
// Fake host
// ============================================================================

/// In-memory WordPress host; clones share state
#[derive(Clone)]
pub struct FakeHost {
    available: bool,
    constants: Arc<Mutex<HashMap<String, Value>>>,
    active: Arc<Mutex<HashSet<String>>>,
    activations: Arc<Mutex<Vec<String>>>,
    activation_error: Option<String>,
    capability_checks: Arc<AtomicUsize>,
}

impl FakeHost {
    /// Host for `site`: directories defined, nothing else
    pub fn new(site: &Site) -> Self {
        let mut constants = HashMap::new();
        constants.insert(
            "WP_PLUGIN_DIR".to_string(),
            json!(site.plugins_dir.to_string_lossy().into_owned()),
        );
        constants.insert(
            "WP_CONTENT_DIR".to_string(),
            json!(site.content_dir.to_string_lossy().into_owned()),
        );

        Self {
            available: true,
            constants: Arc::new(Mutex::new(constants)),
            active: Arc::new(Mutex::new(HashSet::new())),
            activations: Arc::new(Mutex::new(Vec::new())),
            activation_error: None,
            capability_checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Active plugin and a complete `WP_REDIS_CONFIG` matching the defaults
    pub fn healthy(site: &Site) -> Self {
        Self::new(site)
            .with_active(PLUGIN_ID)
            .with_constant(
                "WP_REDIS_CONFIG",
                json!({"host": "redis", "port": 6379, "database": 0}),
            )
    }

    /// No WordPress runtime behind this host
    pub fn unavailable(site: &Site) -> Self {
        Self {
            available: false,
            ..Self::new(site)
        }
    }

    pub fn with_constant(self, name: &str, value: Value) -> Self {
        self.constants.lock().insert(name.to_string(), value);
        self
    }

    pub fn without_constant(self, name: &str) -> Self {
        self.constants.lock().remove(name);
        self
    }

    pub fn with_active(self, id: &str) -> Self {
        self.active.lock().insert(id.to_string());
        self
    }

    pub fn with_activation_error(mut self, message: &str) -> Self {
        self.activation_error = Some(message.to_string());
        self
    }

    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().clone()
    }

    pub fn capability_checks(&self) -> usize {
        self.capability_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn has_capability(&self) -> bool {
        self.capability_checks.fetch_add(1, Ordering::SeqCst);
        self.available
    }

    async fn get_config(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.constants.lock().get(name).cloned())
    }

    async fn plugin_active(&self, id: &str) -> Result<bool> {
        Ok(self.active.lock().contains(id))
    }

    async fn activate_plugin(&self, id: &str) -> Result<()> {
        self.activations.lock().push(id.to_string());
        match self.activation_error {
            Some(ref message) => Err(Error::Host(message.clone())),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Probes
// ============================================================================

/// Probe returning a fixed snapshot and counting calls
#[derive(Clone)]
pub struct StaticProbe {
    snapshot: CapabilitySnapshot,
    calls: Arc<AtomicUsize>,
}

impl StaticProbe {
    pub fn new(redis: Option<&str>, igbinary: Option<&str>) -> Self {
        Self {
            snapshot: CapabilitySnapshot {
                redis_client: redis.map(str::to_string),
                fast_serialization: igbinary.map(str::to_string),
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Both extensions loaded
    pub fn full() -> Self {
        Self::new(Some("6.0.2"), Some("3.2.15"))
    }

    /// Nothing loaded
    pub fn bare() -> Self {
        Self::new(None, None)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapabilityProbe for StaticProbe {
    async fn probe(&self) -> Result<CapabilitySnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// Extension query that always fails
pub struct FailingProbe;

#[async_trait]
impl CapabilityProbe for FailingProbe {
    async fn probe(&self) -> Result<CapabilitySnapshot> {
        Err(Error::Host("php: command not found".to_string()))
    }
}

// ============================================================================
// Cache connectors
// ============================================================================

/// How a [`ScriptedCache`] misbehaves
#[derive(Clone, Copy, Debug)]
pub enum Fault {
    /// Reads return the stored value with a suffix appended
    MutateReads,
    /// Reads return nothing
    DropWrites,
    /// INFO fails after connecting
    InfoFails,
}

/// Cache that records the endpoint and timeout it was asked for and
/// optionally injects a fault into the session
#[derive(Clone)]
pub struct ScriptedCache {
    inner: MemoryCache,
    fault: Option<Fault>,
    requests: Arc<Mutex<Vec<(Endpoint, Duration)>>>,
}

impl ScriptedCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(),
            fault: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn requests(&self) -> Vec<(Endpoint, Duration)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl CacheConnector for ScriptedCache {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn CacheConnection>> {
        self.requests.lock().push((endpoint.clone(), timeout));
        let inner = self.inner.connect(endpoint, timeout).await?;
        Ok(Box::new(ScriptedConnection {
            inner,
            fault: self.fault,
        }))
    }
}

struct ScriptedConnection {
    inner: Box<dyn CacheConnection>,
    fault: Option<Fault>,
}

#[async_trait]
impl CacheConnection for ScriptedConnection {
    async fn server_version(&mut self) -> Result<String> {
        match self.fault {
            Some(Fault::InfoFails) => {
                Err(CacheError::Command("NOPERM this user has no permissions".to_string()).into())
            }
            _ => self.inner.server_version().await,
        }
    }

    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        match self.fault {
            Some(Fault::DropWrites) => Ok(()),
            _ => self.inner.set_ex(key, value, ttl_secs).await,
        }
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value = self.inner.get(key).await?;
        match self.fault {
            Some(Fault::MutateReads) => Ok(value.map(|v| format!("{}!", v))),
            _ => Ok(value),
        }
    }
}

// ============================================================================
// Running
// ============================================================================

/// Run `diagnostic`, returning its result and everything it wrote
pub async fn run_captured<H, P, C>(
    diagnostic: &Diagnostic<H, P, C>,
) -> (Result<DiagnosticReport>, String)
where
    H: Host,
    P: CapabilityProbe,
    C: CacheConnector,
{
    let mut out = Vec::new();
    let result = diagnostic.run(&mut out).await;
    let text = String::from_utf8(out).expect("Output is not UTF-8");
    (result, text)
}

/// Lines of `text` carrying a status icon
pub fn status_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| l.starts_with('✅') || l.starts_with('❌') || l.starts_with('⚠'))
        .collect()
}
