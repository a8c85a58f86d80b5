//! Domain types for the WarpGrid state store.
//!
//! These types represent the persisted state of nodes, the workloads placed
//! on them, and the controllers that own those workloads. All types are
//! serializable to/from JSON for storage in redb tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Unique identifier for a node in the cluster.
pub type NodeId = String;

/// Annotation marking a workload mirrored from host-local configuration.
///
/// Mirror workloads are owned by the node agent and cannot be deleted
/// through the control plane. Only the presence of the key matters.
pub const MIRROR_ANNOTATION: &str = "warpgrid.io/config.mirror";

/// Annotation holding the JSON-serialized [`SerializedReference`] of the
/// controller that created a workload.
pub const CREATED_BY_ANNOTATION: &str = "warpgrid.io/created-by";

// ── Node ──────────────────────────────────────────────────────────

/// Information about a node in the cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub address: String,
    pub port: u16,
    /// When set, the scheduler places no new workloads on this node.
    #[serde(default)]
    pub unschedulable: bool,
    /// Bumped by the store on every conditional replace.
    #[serde(default)]
    pub resource_version: u64,
    /// Total memory available on this node (bytes).
    pub capacity_memory_bytes: u64,
    /// Total CPU weight capacity on this node.
    pub capacity_cpu_weight: u32,
    /// Arbitrary labels for scheduling affinity.
    pub labels: HashMap<String, String>,
    /// Unix timestamp of last heartbeat.
    pub last_heartbeat: u64,
}

// ── Workload ──────────────────────────────────────────────────────

/// A single workload instance placed on a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadInstance {
    pub namespace: String,
    pub name: String,
    /// Node the workload is placed on.
    pub node_name: NodeId,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Grace period used when a delete carries no override.
    pub termination_grace_period_seconds: i64,
    /// Set once a graceful delete has been accepted.
    #[serde(default)]
    pub deletion: Option<DeletionState>,
    /// Unix timestamp when this workload was created.
    pub created_at: u64,
}

/// Pending graceful termination of a workload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionState {
    /// Unix timestamp when the delete was accepted.
    pub requested_at: u64,
    pub grace_period_seconds: i64,
}

impl WorkloadInstance {
    /// Build the composite key for the workloads table.
    pub fn table_key(&self) -> String {
        object_key(&self.namespace, &self.name)
    }

    /// Whether the workload is mirrored from node-local configuration.
    pub fn is_mirror(&self) -> bool {
        self.annotations.contains_key(MIRROR_ANNOTATION)
    }

    /// Raw created-by annotation, still serialized.
    pub fn created_by(&self) -> Option<&str> {
        self.annotations.get(CREATED_BY_ANNOTATION).map(String::as_str)
    }

    pub fn is_terminating(&self) -> bool {
        self.deletion.is_some()
    }
}

// ── Controllers ───────────────────────────────────────────────────

/// Higher-level controllers whose existence marks a workload as managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    ReplicationGroup,
    Job,
    DaemonSet,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 3] = [
        ControllerKind::ReplicationGroup,
        ControllerKind::Job,
        ControllerKind::DaemonSet,
    ];

    /// Parse a reference kind. Unrecognized kinds yield `None`.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "ReplicationGroup" => Some(ControllerKind::ReplicationGroup),
            "Job" => Some(ControllerKind::Job),
            "DaemonSet" => Some(ControllerKind::DaemonSet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerKind::ReplicationGroup => "ReplicationGroup",
            ControllerKind::Job => "Job",
            ControllerKind::DaemonSet => "DaemonSet",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A controller record (ReplicationGroup, Job, or DaemonSet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerSpec {
    pub kind: ControllerKind,
    pub namespace: String,
    pub name: String,
    /// Unix timestamp when this controller was created.
    pub created_at: u64,
}

impl ControllerSpec {
    /// Build the composite key for the controller's table.
    pub fn table_key(&self) -> String {
        object_key(&self.namespace, &self.name)
    }
}

// ── Owner references ──────────────────────────────────────────────

/// Envelope stored in the created-by annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerializedReference {
    pub kind: String,
    #[serde(default)]
    pub api_version: Option<String>,
    pub reference: ObjectReference,
}

/// Pointer to another object in the control plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub resource_version: Option<String>,
}

impl SerializedReference {
    /// Wrap a reference to a controller, as a controller would when it
    /// stamps the created-by annotation on a workload it creates.
    pub fn to_controller(controller: &ControllerSpec) -> Self {
        Self {
            kind: "SerializedReference".to_string(),
            api_version: Some("v1".to_string()),
            reference: ObjectReference {
                kind: controller.kind.as_str().to_string(),
                namespace: controller.namespace.clone(),
                name: controller.name.clone(),
                uid: None,
                api_version: None,
                resource_version: None,
            },
        }
    }
}

/// `{namespace}/{name}` key used by every namespaced table.
pub fn object_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}
