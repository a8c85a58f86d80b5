//! Toggle a node's schedulability.

use tracing::{debug, info};

use crate::client::ControlPlane;
use crate::error::DrainResult;
use crate::report::StatusSink;
use crate::resolve::{ResourceInfo, ResourceObject};

/// What [`set_schedulability`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The flag already had the desired value; nothing was written.
    NoOp,
    /// The flag was flipped with a single replace.
    Changed,
    /// The resource is not a node.
    Skipped,
}

/// Set the node's `unschedulable` flag to `desired`.
///
/// Issues at most one compare-and-replace write. On success the handle is
/// updated with the stored object, so a following write on the same handle
/// carries the current resource version. Write errors are returned as-is.
pub fn set_schedulability<C>(
    client: &C,
    info: &mut ResourceInfo,
    desired: bool,
    sink: &mut dyn StatusSink,
) -> DrainResult<ToggleOutcome>
where
    C: ControlPlane + ?Sized,
{
    let node = match &mut info.object {
        ResourceObject::Node(node) => node,
        ResourceObject::Workload(_) => {
            debug!(kind = %info.kind, name = %info.name, "not a node, skipping");
            sink.success(info.kind.as_str(), &info.name, "skipped")?;
            return Ok(ToggleOutcome::Skipped);
        }
    };

    if node.unschedulable == desired {
        sink.success(info.kind.as_str(), &info.name, already(desired))?;
        return Ok(ToggleOutcome::NoOp);
    }

    let mut updated = node.clone();
    updated.unschedulable = desired;
    *node = client.replace_node(&updated)?;
    info!(node = %info.name, unschedulable = desired, "node schedulability changed");
    sink.success(info.kind.as_str(), &info.name, changed(desired))?;
    Ok(ToggleOutcome::Changed)
}

fn already(desired: bool) -> &'static str {
    if desired {
        "already cordoned"
    } else {
        "already uncordoned"
    }
}

fn changed(desired: bool) -> &'static str {
    if desired { "cordoned" } else { "uncordoned" }
}
