//! WordPress host environment.
//!
//! The diagnostic never talks to WordPress directly. Everything it needs
//! from the site (constants, plugin state, plugin activation) goes through
//! the [`Host`] trait so tests can substitute a fake site.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{php_display, WP_CONTENT_DIR, WP_PLUGIN_DIR};
use crate::{Error, Result};

pub mod wp_cli;

pub use wp_cli::{WpCli, WpCliHost};

/// Capabilities of a WordPress installation
#[async_trait]
pub trait Host: Send + Sync {
    /// Whether a WordPress runtime is reachable at all
    async fn has_capability(&self) -> bool;

    /// Value of a defined constant, `None` when undefined
    async fn get_config(&self, name: &str) -> Result<Option<Value>>;

    /// Whether the plugin `id` (`<dir>/<main file>`) is active
    async fn plugin_active(&self, id: &str) -> Result<bool>;

    /// Activate the plugin `id`
    async fn activate_plugin(&self, id: &str) -> Result<()>;
}

/// Filesystem locations of the WordPress installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    pub plugins_dir: PathBuf,
    pub content_dir: PathBuf,
}

impl HostLayout {
    /// Read `WP_PLUGIN_DIR` and `WP_CONTENT_DIR` from the host
    pub async fn resolve(host: &dyn Host) -> Result<Self> {
        let plugins_dir = required_dir(host, WP_PLUGIN_DIR).await?;
        let content_dir = required_dir(host, WP_CONTENT_DIR).await?;

        debug!(
            "Resolved layout: plugins={}, content={}",
            plugins_dir.display(),
            content_dir.display()
        );

        Ok(Self {
            plugins_dir,
            content_dir,
        })
    }
}

async fn required_dir(host: &dyn Host, name: &str) -> Result<PathBuf> {
    match host.get_config(name).await? {
        Some(value) => {
            let path = php_display(&value);
            if path.is_empty() {
                Err(Error::Host(format!("{} is empty", name)))
            } else {
                Ok(PathBuf::from(path))
            }
        }
        None => Err(Error::Host(format!("{} is not defined", name))),
    }
}
