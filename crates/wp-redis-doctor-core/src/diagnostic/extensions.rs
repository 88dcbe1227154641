use std::io::Write;

use super::{Context, Section};
use crate::probe::Capability;
use crate::report::Finding;
use crate::Result;

pub(super) fn run<W: Write>(ctx: &Context<'_>, section: &mut Section<'_, W>) -> Result<()> {
    if let Some(error) = ctx.capability_error {
        return section.emit(Finding::fail("Could not query PHP extensions").with_detail(error));
    }

    match ctx.capabilities.version(Capability::RedisClient) {
        Some(version) => section.emit(
            Finding::pass("PHP Redis extension installed").with_detail(format!("Version: {}", version)),
        )?,
        None => section.emit(
            Finding::fail("PHP Redis extension NOT installed")
                .with_detail("Redis won't work without this extension"),
        )?,
    }

    // igbinary is optional
    match ctx.capabilities.version(Capability::FastSerialization) {
        Some(version) => section.emit(
            Finding::pass("PHP igbinary extension installed")
                .with_detail(format!("Version: {}", version)),
        )?,
        None => section.emit(
            Finding::warn("PHP igbinary extension NOT installed")
                .with_detail("Redis will work but without optimal serialization"),
        )?,
    }

    Ok(())
}
