//! Host implementation backed by the `wp` command line tool.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

use super::Host;
use crate::{Error, Result};

/// Runs PHP snippets inside a WordPress installation through WP-CLI
#[derive(Debug, Clone)]
pub struct WpCli {
    binary: PathBuf,
    path: Option<PathBuf>,
    allow_root: bool,
}

impl Default for WpCli {
    fn default() -> Self {
        Self::new("wp")
    }
}

impl WpCli {
    /// Use the WP-CLI executable at `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            path: None,
            allow_root: false,
        }
    }

    /// WordPress root directory (`--path`)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Pass `--allow-root` (needed when running as root in containers)
    pub fn with_allow_root(mut self, allow_root: bool) -> Self {
        self.allow_root = allow_root;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(ref path) = self.path {
            cmd.arg(format!("--path={}", path.display()));
        }
        if self.allow_root {
            cmd.arg("--allow-root");
        }
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Evaluate `code` with `wp eval` and return its trimmed standard output
    pub async fn eval(&self, code: &str) -> Result<String> {
        trace!("wp eval: {}", code);

        let output = self
            .command()
            .arg("eval")
            .arg(code)
            .output()
            .await
            .map_err(|e| {
                Error::Host(format!("Failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Host(format!(
                "wp eval exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Evaluate `code` and return only what it printed between the payload
    /// markers. Notices that WordPress or plugins print while loading land
    /// outside the markers and are dropped.
    pub async fn eval_payload(&self, code: &str) -> Result<String> {
        let output = self.eval(&wrap_payload(code)).await?;
        extract_payload(&output)
    }
}

/// Printed immediately before a snippet's payload
pub const PAYLOAD_BEGIN: &str = "<<<WP_REDIS_DOCTOR_BEGIN>>>";
/// Printed immediately after a snippet's payload
pub const PAYLOAD_END: &str = "<<<WP_REDIS_DOCTOR_END>>>";

fn wrap_payload(code: &str) -> String {
    format!("echo '{}'; {} echo '{}';", PAYLOAD_BEGIN, code, PAYLOAD_END)
}

fn extract_payload(output: &str) -> Result<String> {
    let start = output
        .rfind(PAYLOAD_BEGIN)
        .map(|i| i + PAYLOAD_BEGIN.len())
        .ok_or_else(|| Error::Host(format!("No payload in WP-CLI output: {}", output)))?;

    let len = output[start..]
        .find(PAYLOAD_END)
        .ok_or_else(|| Error::Host(format!("Truncated payload in WP-CLI output: {}", output)))?;

    let noise = output[..start - PAYLOAD_BEGIN.len()].trim();
    if !noise.is_empty() {
        debug!("Ignoring WP-CLI output outside payload: {}", noise);
    }

    Ok(output[start..start + len].trim().to_string())
}

/// [`Host`] that queries a live site through WP-CLI
#[derive(Debug, Clone, Default)]
pub struct WpCliHost {
    cli: WpCli,
}

impl WpCliHost {
    pub fn new(cli: WpCli) -> Self {
        Self { cli }
    }
}

/// Constant names are interpolated into PHP source, so only identifiers pass.
fn validate_constant_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid constant name: {:?}", name)))
    }
}

fn validate_plugin_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && !id.contains("..")
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'));

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid plugin identifier: {:?}", id)))
    }
}

const LOAD_PLUGIN_API: &str = "if (!function_exists('is_plugin_active')) { require_once ABSPATH . 'wp-admin/includes/plugin.php'; }";

fn config_snippet(name: &str) -> String {
    format!(
        "if (defined('{name}')) {{ echo json_encode(constant('{name}')); }}",
        name = name
    )
}

fn plugin_active_snippet(id: &str) -> String {
    format!(
        "{} echo is_plugin_active('{}') ? 'yes' : 'no';",
        LOAD_PLUGIN_API, id
    )
}

fn activate_snippet(id: &str) -> String {
    format!(
        "{} $result = activate_plugin('{}'); if (is_wp_error($result)) {{ fwrite(STDERR, $result->get_error_message()); exit(1); }}",
        LOAD_PLUGIN_API, id
    )
}

/// Parse the output of [`config_snippet`]; empty output means undefined.
fn parse_config_output(name: &str, output: &str) -> Result<Option<Value>> {
    if output.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(output).map_err(|e| {
        Error::Serialization(format!("Unexpected value for {}: {} ({})", name, output, e))
    })?;
    Ok(Some(value))
}

#[async_trait]
impl Host for WpCliHost {
    async fn has_capability(&self) -> bool {
        match self
            .cli
            .eval_payload("echo function_exists('add_action') ? 'yes' : 'no';")
            .await
        {
            Ok(out) => out == "yes",
            Err(e) => {
                debug!("WordPress host not reachable: {}", e);
                false
            }
        }
    }

    async fn get_config(&self, name: &str) -> Result<Option<Value>> {
        validate_constant_name(name)?;
        let output = self.cli.eval_payload(&config_snippet(name)).await?;
        let value = parse_config_output(name, &output)?;
        debug!("Constant {} = {:?}", name, value);
        Ok(value)
    }

    async fn plugin_active(&self, id: &str) -> Result<bool> {
        validate_plugin_id(id)?;
        let output = self.cli.eval_payload(&plugin_active_snippet(id)).await?;
        Ok(output == "yes")
    }

    async fn activate_plugin(&self, id: &str) -> Result<()> {
        validate_plugin_id(id)?;
        self.cli.eval(&activate_snippet(id)).await?;
        Ok(())
    }
}
