//! StateStore — redb-backed state persistence for WarpGrid.
//!
//! Provides typed CRUD operations over nodes, workloads, and controllers.
//! All values are JSON-serialized into redb's `&[u8]` value columns. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(NODES).map_err(map_err!(Table))?;
        txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        for kind in ControllerKind::ALL {
            txn.open_table(controller_table(kind)).map_err(map_err!(Table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Nodes ──────────────────────────────────────────────────────

    /// Insert or update a node info unconditionally.
    pub fn put_node(&self, node: &NodeInfo) -> StateResult<()> {
        let value = serde_json::to_vec(node).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            table
                .insert(node.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(node_id = %node.id, "node stored");
        Ok(())
    }

    /// Get a node by ID.
    pub fn get_node(&self, node_id: &str) -> StateResult<Option<NodeInfo>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        match table.get(node_id).map_err(map_err!(Read))? {
            Some(guard) => {
                let node: NodeInfo =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// List all nodes.
    pub fn list_nodes(&self) -> StateResult<Vec<NodeInfo>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let node: NodeInfo =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(node);
        }
        Ok(results)
    }

    /// Replace a node only if its `resource_version` still matches the
    /// stored one. Returns the stored node with the bumped version.
    pub fn replace_node(&self, node: &NodeInfo) -> StateResult<NodeInfo> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let stored;
        {
            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            let current: NodeInfo = match table.get(node.id.as_str()).map_err(map_err!(Read))? {
                Some(guard) => {
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?
                }
                None => return Err(StateError::NotFound(format!("node {}", node.id))),
            };
            if current.resource_version != node.resource_version {
                return Err(StateError::Conflict {
                    key: node.id.clone(),
                    expected: node.resource_version,
                    actual: current.resource_version,
                });
            }

            let mut next = node.clone();
            next.resource_version = current.resource_version + 1;
            let value = serde_json::to_vec(&next).map_err(map_err!(Serialize))?;
            table
                .insert(next.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            stored = next;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            node_id = %stored.id,
            resource_version = stored.resource_version,
            "node replaced"
        );
        Ok(stored)
    }

    /// Delete a node by ID. Returns true if it existed.
    pub fn delete_node(&self, node_id: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            existed = table.remove(node_id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    // ── Workloads ──────────────────────────────────────────────────

    /// Insert or update a workload instance.
    pub fn put_workload(&self, workload: &WorkloadInstance) -> StateResult<()> {
        let key = workload.table_key();
        let value = serde_json::to_vec(workload).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, node = %workload.node_name, "workload stored");
        Ok(())
    }

    /// Get a workload by namespace and name.
    pub fn get_workload(&self, namespace: &str, name: &str) -> StateResult<Option<WorkloadInstance>> {
        let key = object_key(namespace, name);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let workload: WorkloadInstance =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(workload))
            }
            None => Ok(None),
        }
    }

    /// List all workloads in key order.
    pub fn list_workloads(&self) -> StateResult<Vec<WorkloadInstance>> {
        self.scan_workloads(|_| true)
    }

    /// List workloads placed on the given node, across all namespaces.
    pub fn list_workloads_on_node(&self, node_id: &str) -> StateResult<Vec<WorkloadInstance>> {
        self.scan_workloads(|w| w.node_name == node_id)
    }

    fn scan_workloads<F>(&self, keep: F) -> StateResult<Vec<WorkloadInstance>>
    where
        F: Fn(&WorkloadInstance) -> bool,
    {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let workload: WorkloadInstance =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if keep(&workload) {
                results.push(workload);
            }
        }
        Ok(results)
    }

    /// Request deletion of a workload.
    ///
    /// The effective grace period is `grace_period_seconds` when given,
    /// otherwise the workload's own default. A non-positive grace period
    /// removes the record immediately; anything else marks the workload as
    /// terminating and leaves removal to the node agent. Returns without
    /// waiting in both cases.
    pub fn delete_workload(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: Option<i64>,
    ) -> StateResult<()> {
        let key = object_key(namespace, name);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let grace;
        {
            let mut table = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
            let mut workload: WorkloadInstance =
                match table.get(key.as_str()).map_err(map_err!(Read))? {
                    Some(guard) => {
                        serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?
                    }
                    None => return Err(StateError::NotFound(format!("workload {key}"))),
                };

            grace = grace_period_seconds.unwrap_or(workload.termination_grace_period_seconds);
            if grace <= 0 {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            } else {
                // A second delete may shorten a pending grace period, never extend it.
                let grace = match workload.deletion {
                    Some(pending) => pending.grace_period_seconds.min(grace),
                    None => grace,
                };
                workload.deletion = Some(DeletionState {
                    requested_at: epoch_secs(),
                    grace_period_seconds: grace,
                });
                let value = serde_json::to_vec(&workload).map_err(map_err!(Serialize))?;
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, grace, "workload deletion accepted");
        Ok(())
    }

    // ── Controllers ────────────────────────────────────────────────

    /// Insert or update a controller record.
    pub fn put_controller(&self, controller: &ControllerSpec) -> StateResult<()> {
        let key = controller.table_key();
        let value = serde_json::to_vec(controller).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn
                .open_table(controller_table(controller.kind))
                .map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(kind = %controller.kind, %key, "controller stored");
        Ok(())
    }

    /// Get a controller of the given kind by namespace and name.
    pub fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> StateResult<Option<ControllerSpec>> {
        let key = object_key(namespace, name);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn
            .open_table(controller_table(kind))
            .map_err(map_err!(Table))?;
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let controller: ControllerSpec =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(controller))
            }
            None => Ok(None),
        }
    }

    /// Delete a controller. Returns true if it existed.
    pub fn delete_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> StateResult<bool> {
        let key = object_key(namespace, name);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn
                .open_table(controller_table(kind))
                .map_err(map_err!(Table))?;
            existed = table.remove(key.as_str()).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%kind, %key, existed, "controller deleted");
        Ok(existed)
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
