use std::io::Write;
use tracing::{info, warn};

use super::{path_exists, Context, Section};
use crate::report::Finding;
use crate::Result;

pub(super) async fn run<W: Write>(ctx: &Context<'_>, section: &mut Section<'_, W>) -> Result<()> {
    let id = ctx.settings.plugin_id.as_str();
    let plugin_path = ctx.layout.plugins_dir.join(id);

    if !path_exists(&plugin_path).await {
        return section.emit(
            Finding::fail("Object Cache Pro plugin files NOT found at expected location")
                .with_detail(format!("Expected path: {}", plugin_path.display())),
        );
    }

    section.emit(Finding::pass("Object Cache Pro plugin files found"))?;

    match ctx.host.plugin_active(id).await {
        Ok(true) => section.emit(Finding::pass("Object Cache Pro plugin is active")),
        Ok(false) => {
            section.emit(Finding::fail(
                "Object Cache Pro plugin is installed but NOT active",
            ))?;
            section.note("Activating plugin...")?;

            // The result is not re-checked; a second run shows whether it took.
            match ctx.host.activate_plugin(id).await {
                Ok(()) => info!("Activated plugin {}", id),
                Err(e) => warn!("Activating plugin {} failed: {}", id, e),
            }
            section.note("Plugin activation attempted")
        }
        Err(e) => section.emit(
            Finding::fail("Could not determine whether Object Cache Pro is active")
                .with_detail(e.to_string()),
        ),
    }
}
