//! `warp nodes` — list nodes with their schedulability.

use std::io::Write;

use super::Context;

pub fn list(ctx: &Context, mut out: impl Write) -> anyhow::Result<()> {
    let nodes = ctx.store.list_nodes()?;
    let workloads = ctx.store.list_workloads()?;

    writeln!(out, "{:<24} {:<26} {:>9}", "NAME", "STATUS", "WORKLOADS")?;
    for node in &nodes {
        let status = if node.unschedulable {
            "Ready,SchedulingDisabled"
        } else {
            "Ready"
        };
        let count = workloads.iter().filter(|w| w.node_name == node.id).count();
        writeln!(out, "{:<24} {:<26} {:>9}", node.id, status, count)?;
    }
    Ok(())
}
