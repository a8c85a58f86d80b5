//! Resolve a command-line resource argument to a fetched object.
//!
//! Arguments are either a bare name, taken to be a node, or `TYPE/NAME`
//! where `TYPE` is any alias of a known resource kind. Namespaced kinds are
//! looked up in the caller's namespace.

use std::fmt;
use std::str::FromStr;

use tracing::debug;
use warpgrid_state::{NodeInfo, WorkloadInstance};

use crate::client::ControlPlane;
use crate::error::{DrainError, DrainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Node,
    Workload,
}

impl ResourceKind {
    /// Name used when reporting status for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Node => "node",
            ResourceKind::Workload => "workload",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = DrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" | "nodes" | "no" => Ok(ResourceKind::Node),
            "workload" | "workloads" | "pod" | "pods" | "po" => Ok(ResourceKind::Workload),
            _ => Err(DrainError::UnknownResourceType(s.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fetched object behind a [`ResourceInfo`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceObject {
    Node(NodeInfo),
    Workload(WorkloadInstance),
}

/// A resolved resource: its kind, display name, and current object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInfo {
    pub kind: ResourceKind,
    /// Empty for cluster-scoped kinds.
    pub namespace: String,
    pub name: String,
    pub object: ResourceObject,
}

impl ResourceInfo {
    pub fn node(node: NodeInfo) -> Self {
        Self {
            kind: ResourceKind::Node,
            namespace: String::new(),
            name: node.id.clone(),
            object: ResourceObject::Node(node),
        }
    }

    pub fn workload(workload: WorkloadInstance) -> Self {
        Self {
            kind: ResourceKind::Workload,
            namespace: workload.namespace.clone(),
            name: workload.name.clone(),
            object: ResourceObject::Workload(workload),
        }
    }
}

/// Split `arg` into a kind and a name; bare names are nodes.
pub fn parse_resource_arg(arg: &str) -> DrainResult<(ResourceKind, &str)> {
    let (kind, name) = match arg.split_once('/') {
        Some((kind, name)) => (kind.parse::<ResourceKind>()?, name),
        None => (ResourceKind::Node, arg),
    };
    if name.is_empty() || name.contains('/') {
        return Err(DrainError::InvalidName(arg.to_string()));
    }
    Ok((kind, name))
}

/// Fetch the resource named by `arg`.
pub fn resolve<C>(client: &C, arg: &str, namespace: &str) -> DrainResult<ResourceInfo>
where
    C: ControlPlane + ?Sized,
{
    let (kind, name) = parse_resource_arg(arg)?;
    let not_found = |err: warpgrid_state::StateError| {
        if err.is_not_found() {
            DrainError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            }
        } else {
            err.into()
        }
    };

    let info = match kind {
        ResourceKind::Node => ResourceInfo::node(client.get_node(name).map_err(not_found)?),
        ResourceKind::Workload => {
            ResourceInfo::workload(client.get_workload(namespace, name).map_err(not_found)?)
        }
    };
    debug!(kind = %info.kind, name = %info.name, "resource resolved");
    Ok(info)
}
