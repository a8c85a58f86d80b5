//! redb table definitions for the WarpGrid state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).
//! Namespaced objects are keyed `{namespace}/{name}`.

use redb::TableDefinition;

use crate::types::ControllerKind;

/// Node info keyed by `{node_id}`.
pub const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");

/// Workload instances keyed by `{namespace}/{name}`.
pub const WORKLOADS: TableDefinition<&str, &[u8]> = TableDefinition::new("workloads");

/// ReplicationGroup controllers keyed by `{namespace}/{name}`.
pub const REPLICATION_GROUPS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("replication_groups");

/// Job controllers keyed by `{namespace}/{name}`.
pub const JOBS: TableDefinition<&str, &[u8]> = TableDefinition::new("jobs");

/// DaemonSet controllers keyed by `{namespace}/{name}`.
pub const DAEMON_SETS: TableDefinition<&str, &[u8]> = TableDefinition::new("daemon_sets");

/// Table holding controllers of the given kind.
pub fn controller_table(kind: ControllerKind) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match kind {
        ControllerKind::ReplicationGroup => REPLICATION_GROUPS,
        ControllerKind::Job => JOBS,
        ControllerKind::DaemonSet => DAEMON_SETS,
    }
}
