use std::io::Write;

use super::{Context, Section};
use crate::config::{is_truthy, RedisConfig, WP_REDIS_CONFIG, WP_REDIS_DISABLED};
use crate::report::Finding;
use crate::Result;

pub(super) async fn run<W: Write>(ctx: &Context<'_>, section: &mut Section<'_, W>) -> Result<()> {
    match ctx.host.get_config(WP_REDIS_DISABLED).await {
        Ok(Some(value)) if is_truthy(&value) => section.emit(Finding::warn(
            "WP_REDIS_DISABLED is set to true - Redis cache is disabled",
        ))?,
        Ok(_) => {}
        Err(e) => section.emit(
            Finding::warn(format!("Could not read {}", WP_REDIS_DISABLED)).with_detail(e.to_string()),
        )?,
    }

    let value = match ctx.host.get_config(WP_REDIS_CONFIG).await {
        Ok(Some(value)) => value,
        Ok(None) => {
            return section.emit(Finding::fail(
                "WP_REDIS_CONFIG is not defined in wp-config.php",
            ))
        }
        Err(e) => {
            return section.emit(
                Finding::fail(format!("Could not read {}", WP_REDIS_CONFIG))
                    .with_detail(e.to_string()),
            )
        }
    };

    let finding = match RedisConfig::from_value(&value) {
        Ok(config) => Finding::pass("WP_REDIS_CONFIG is defined")
            .with_detail(format!("Host: {}", config.host_display()))
            .with_detail(format!("Port: {}", config.port_display()))
            .with_detail(format!("Database: {}", config.database_display())),
        Err(e) => Finding::warn("WP_REDIS_CONFIG is defined but could not be parsed")
            .with_detail(e.to_string()),
    };
    section.emit(finding)
}
