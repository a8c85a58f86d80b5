//! `warp cordon`, `warp uncordon`, `warp drain`.

use std::io::Write;

use tracing::info;
use warpgrid_drain::{resolve, DrainOptions, NodeDrainer, PrintSink};

use super::Context;

pub fn cordon(ctx: &Context, node: &str, out: impl Write) -> anyhow::Result<()> {
    let mut info = resolve(&ctx.store, node, &ctx.namespace)?;
    let mut sink = PrintSink::new(out);
    NodeDrainer::new(&ctx.store, &mut sink).cordon(&mut info)?;
    Ok(())
}

pub fn uncordon(ctx: &Context, node: &str, out: impl Write) -> anyhow::Result<()> {
    let mut info = resolve(&ctx.store, node, &ctx.namespace)?;
    let mut sink = PrintSink::new(out);
    NodeDrainer::new(&ctx.store, &mut sink).uncordon(&mut info)?;
    Ok(())
}

/// An unset `--grace-period` falls back to the `[drain]` config section.
/// `force` comes from the flag alone.
pub fn drain(
    ctx: &Context,
    node: &str,
    force: bool,
    grace_period: Option<i64>,
    out: impl Write,
) -> anyhow::Result<()> {
    let options = DrainOptions {
        force,
        grace_period_seconds: grace_period.unwrap_or(ctx.config.drain.grace_period),
    };
    info!(%node, force = options.force, grace = options.grace_period_seconds, "draining node");

    let mut info = resolve(&ctx.store, node, &ctx.namespace)?;
    let mut sink = PrintSink::new(out);
    NodeDrainer::new(&ctx.store, &mut sink).drain(&mut info, options)?;
    Ok(())
}
