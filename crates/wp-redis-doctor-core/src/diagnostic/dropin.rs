use std::io::Write;
use tracing::{info, warn};

use super::{path_exists, Context, Section};
use crate::report::Finding;
use crate::Result;

pub(super) const DROPIN_FILE: &str = "object-cache.php";

pub(super) async fn run<W: Write>(ctx: &Context<'_>, section: &mut Section<'_, W>) -> Result<()> {
    let dropin_path = ctx.layout.content_dir.join(DROPIN_FILE);

    if path_exists(&dropin_path).await {
        section.emit(Finding::pass("object-cache.php drop-in exists"))?;

        let contents = match tokio::fs::read(&dropin_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read {}: {}", dropin_path.display(), e);
                return section.emit(
                    Finding::warn("Drop-in exists but could not be read").with_detail(e.to_string()),
                );
            }
        };

        let signature = ctx.settings.dropin_signature.as_bytes();
        let authentic = !signature.is_empty()
            && contents
                .windows(signature.len())
                .any(|window| window == signature);

        return if authentic {
            section.emit(Finding::pass("Drop-in is from Object Cache Pro"))
        } else {
            section.emit(
                Finding::warn("Drop-in exists but might not be from Object Cache Pro")
                    .with_detail("Consider replacing it with the correct version"),
            )
        };
    }

    section.emit(Finding::fail("object-cache.php drop-in NOT found"))?;
    section.note("Installing drop-in...")?;

    let source_path = ctx
        .layout
        .plugins_dir
        .join(ctx.settings.plugin_slug())
        .join("stubs")
        .join(DROPIN_FILE);

    if !path_exists(&source_path).await {
        return section.emit(Finding::fail(format!(
            "Source drop-in file not found at: {}",
            source_path.display()
        )));
    }

    match tokio::fs::copy(&source_path, &dropin_path).await {
        Ok(bytes) => {
            info!(
                "Copied {} to {} ({} bytes)",
                source_path.display(),
                dropin_path.display(),
                bytes
            );
            section.emit(Finding::pass("Drop-in installed successfully"))
        }
        Err(e) => {
            warn!("Failed to copy drop-in: {}", e);
            section.emit(Finding::fail("Failed to install drop-in").with_detail(e.to_string()))
        }
    }
}
