//! Control-plane access used by the maintenance operations.
//!
//! The operations never touch storage directly; they go through
//! [`ControlPlane`], which [`StateStore`] implements. Lookups that find
//! nothing surface as [`StateError::NotFound`] so callers see one error
//! shape regardless of backend.

use warpgrid_state::{
    ControllerKind, ControllerSpec, NodeInfo, StateError, StateResult, StateStore,
    WorkloadInstance,
};

pub trait ControlPlane {
    fn get_node(&self, name: &str) -> StateResult<NodeInfo>;

    fn get_workload(&self, namespace: &str, name: &str) -> StateResult<WorkloadInstance>;

    /// Workloads placed on `node_name`, across all namespaces, in the
    /// order the control plane returns them.
    fn list_workloads_on_node(&self, node_name: &str) -> StateResult<Vec<WorkloadInstance>>;

    fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> StateResult<ControllerSpec>;

    /// Compare-and-replace of the whole node object.
    fn replace_node(&self, node: &NodeInfo) -> StateResult<NodeInfo>;

    /// Request deletion; `None` keeps the workload's own grace period.
    fn delete_workload(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: Option<i64>,
    ) -> StateResult<()>;
}

impl ControlPlane for StateStore {
    fn get_node(&self, name: &str) -> StateResult<NodeInfo> {
        StateStore::get_node(self, name)?
            .ok_or_else(|| StateError::NotFound(format!("node {name}")))
    }

    fn get_workload(&self, namespace: &str, name: &str) -> StateResult<WorkloadInstance> {
        StateStore::get_workload(self, namespace, name)?
            .ok_or_else(|| StateError::NotFound(format!("workload {namespace}/{name}")))
    }

    fn list_workloads_on_node(&self, node_name: &str) -> StateResult<Vec<WorkloadInstance>> {
        StateStore::list_workloads_on_node(self, node_name)
    }

    fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> StateResult<ControllerSpec> {
        StateStore::get_controller(self, kind, namespace, name)?
            .ok_or_else(|| StateError::NotFound(format!("{kind} {namespace}/{name}")))
    }

    fn replace_node(&self, node: &NodeInfo) -> StateResult<NodeInfo> {
        StateStore::replace_node(self, node)
    }

    fn delete_workload(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: Option<i64>,
    ) -> StateResult<()> {
        StateStore::delete_workload(self, namespace, name, grace_period_seconds)
    }
}
