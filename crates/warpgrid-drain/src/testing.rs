//! Fixtures and a fault-injecting control plane for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use warpgrid_state::*;

use crate::client::ControlPlane;

pub fn node(name: &str, unschedulable: bool) -> NodeInfo {
    NodeInfo {
        id: name.to_string(),
        address: "10.0.0.1".to_string(),
        port: 8443,
        unschedulable,
        resource_version: 0,
        capacity_memory_bytes: 8 * 1024 * 1024 * 1024,
        capacity_cpu_weight: 1000,
        labels: HashMap::new(),
        last_heartbeat: 1000,
    }
}

pub fn workload(namespace: &str, name: &str, node_name: &str) -> WorkloadInstance {
    WorkloadInstance {
        namespace: namespace.to_string(),
        name: name.to_string(),
        node_name: node_name.to_string(),
        annotations: BTreeMap::new(),
        termination_grace_period_seconds: 30,
        deletion: None,
        created_at: 1000,
    }
}

pub fn controller(kind: ControllerKind, name: &str) -> ControllerSpec {
    ControllerSpec {
        kind,
        namespace: "default".to_string(),
        name: name.to_string(),
        created_at: 1000,
    }
}

pub fn mirror(mut workload: WorkloadInstance) -> WorkloadInstance {
    workload
        .annotations
        .insert(MIRROR_ANNOTATION.to_string(), "abc123".to_string());
    workload
}

pub fn owned_by(mut workload: WorkloadInstance, owner: &ControllerSpec) -> WorkloadInstance {
    let reference = serde_json::to_string(&SerializedReference::to_controller(owner)).unwrap();
    workload
        .annotations
        .insert(CREATED_BY_ANNOTATION.to_string(), reference);
    workload
}

pub fn with_created_by(mut workload: WorkloadInstance, raw: &str) -> WorkloadInstance {
    workload
        .annotations
        .insert(CREATED_BY_ANNOTATION.to_string(), raw.to_string());
    workload
}

/// Wraps a [`StateStore`], counting writes and failing selected calls.
pub struct FaultyPlane {
    pub store: StateStore,
    node_read_error: RefCell<Option<String>>,
    controller_error: RefCell<Option<String>>,
    replace_error: RefCell<Option<String>>,
    delete_error: RefCell<Option<(String, String)>>,
    pub replace_calls: Cell<usize>,
    pub deletes: RefCell<Vec<(String, String, Option<i64>)>>,
}

impl FaultyPlane {
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            node_read_error: RefCell::new(None),
            controller_error: RefCell::new(None),
            replace_error: RefCell::new(None),
            delete_error: RefCell::new(None),
            replace_calls: Cell::new(0),
            deletes: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_node_reads(&self, message: &str) {
        *self.node_read_error.borrow_mut() = Some(message.to_string());
    }

    pub fn fail_controller_lookups(&self, message: &str) {
        *self.controller_error.borrow_mut() = Some(message.to_string());
    }

    pub fn fail_replace(&self, message: &str) {
        *self.replace_error.borrow_mut() = Some(message.to_string());
    }

    pub fn fail_delete_of(&self, name: &str, message: &str) {
        *self.delete_error.borrow_mut() = Some((name.to_string(), message.to_string()));
    }

    pub fn deleted_names(&self) -> Vec<String> {
        self.deletes
            .borrow()
            .iter()
            .map(|(_, name, _)| name.clone())
            .collect()
    }
}

impl ControlPlane for FaultyPlane {
    fn get_node(&self, name: &str) -> StateResult<NodeInfo> {
        if let Some(message) = self.node_read_error.borrow().clone() {
            return Err(StateError::Read(message));
        }
        ControlPlane::get_node(&self.store, name)
    }

    fn get_workload(&self, namespace: &str, name: &str) -> StateResult<WorkloadInstance> {
        ControlPlane::get_workload(&self.store, namespace, name)
    }

    fn list_workloads_on_node(&self, node_name: &str) -> StateResult<Vec<WorkloadInstance>> {
        ControlPlane::list_workloads_on_node(&self.store, node_name)
    }

    fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> StateResult<ControllerSpec> {
        if let Some(message) = self.controller_error.borrow().clone() {
            return Err(StateError::Read(message));
        }
        ControlPlane::get_controller(&self.store, kind, namespace, name)
    }

    fn replace_node(&self, node: &NodeInfo) -> StateResult<NodeInfo> {
        self.replace_calls.set(self.replace_calls.get() + 1);
        if let Some(message) = self.replace_error.borrow().clone() {
            return Err(StateError::Write(message));
        }
        ControlPlane::replace_node(&self.store, node)
    }

    fn delete_workload(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: Option<i64>,
    ) -> StateResult<()> {
        if let Some((failing, message)) = self.delete_error.borrow().clone() {
            if failing == name {
                return Err(StateError::Write(message));
            }
        }
        self.deletes.borrow_mut().push((
            namespace.to_string(),
            name.to_string(),
            grace_period_seconds,
        ));
        ControlPlane::delete_workload(&self.store, namespace, name, grace_period_seconds)
    }
}
