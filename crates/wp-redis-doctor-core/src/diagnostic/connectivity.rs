use std::io::Write;
use tracing::debug;

use super::{Context, Section};
use crate::config::{resolve_endpoint, WP_REDIS_HOST, WP_REDIS_PORT};
use crate::probe::Capability;
use crate::report::Finding;
use crate::Result;

/// Key and value of the round-trip test record
fn test_record(prefix: &str) -> (String, String) {
    let key = format!("{}{}", prefix, chrono::Utc::now().timestamp_millis());
    let value = format!(
        "Working at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    (key, value)
}

/// Connect, read the server version and round-trip one record.
///
/// Findings accumulate in `findings` so that whatever was observed before
/// an error is still reported.
async fn probe_server(ctx: &Context<'_>, findings: &mut Vec<Finding>) -> Result<()> {
    let host = ctx.host.get_config(WP_REDIS_HOST).await?;
    let port = ctx.host.get_config(WP_REDIS_PORT).await?;
    let endpoint = resolve_endpoint(host.as_ref(), port.as_ref())?;

    let mut conn = match ctx
        .connector
        .connect(&endpoint, ctx.settings.connect_timeout)
        .await
    {
        Ok(conn) => conn,
        Err(e) if e.is_connect_failure() => {
            debug!("Connection to {} failed: {}", endpoint, e);
            findings.push(Finding::fail("Failed to connect to Redis server").with_detail(e.to_string()));
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let version = conn.server_version().await?;
    findings.push(
        Finding::pass("Successfully connected to Redis server")
            .with_detail(format!("Redis version: {}", version)),
    );

    let (key, value) = test_record(&ctx.settings.test_key_prefix);
    conn.set_ex(&key, &value, ctx.settings.test_ttl_secs).await?;
    let retrieved = conn.get(&key).await?;
    debug!("Round-trip {}: wrote {:?}, read {:?}", key, value, retrieved);

    if retrieved.as_deref() == Some(value.as_str()) {
        findings.push(Finding::pass("Redis read/write test successful"));
    } else {
        findings.push(Finding::fail("Redis read/write test failed"));
    }

    Ok(())
}

pub(super) async fn run<W: Write>(ctx: &Context<'_>, section: &mut Section<'_, W>) -> Result<()> {
    if ctx.capability_error.is_some() {
        return section.emit(Finding::fail(
            "Cannot test connection: PHP extensions could not be queried",
        ));
    }

    if !ctx.capabilities.has(Capability::RedisClient) {
        return section.emit(Finding::fail(
            "Cannot test connection: Redis class not available",
        ));
    }

    let mut findings = Vec::new();
    let outcome = probe_server(ctx, &mut findings).await;

    for finding in findings {
        section.emit(finding)?;
    }

    if let Err(e) = outcome {
        section.emit(Finding::fail(format!("Redis connection error: {}", e)))?;
    }

    Ok(())
}
