//! Drain orchestration — cordon, classify, delete.
//!
//! Each step short-circuits the rest on failure. Nothing is rolled back:
//! a failed drain leaves the node cordoned and already-deleted workloads
//! deleted. Deletes are issued one at a time in list order and do not wait
//! for the workload to terminate.

use tracing::{debug, info};

use crate::client::ControlPlane;
use crate::cordon::{set_schedulability, ToggleOutcome};
use crate::error::DrainResult;
use crate::eviction::EvictionPolicy;
use crate::report::StatusSink;
use crate::resolve::ResourceInfo;

/// Options for [`NodeDrainer::drain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOptions {
    /// Delete workloads not managed by a live controller.
    pub force: bool,
    /// Grace period override in seconds; negative keeps each workload's default.
    pub grace_period_seconds: i64,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            force: false,
            grace_period_seconds: -1,
        }
    }
}

impl DrainOptions {
    /// Grace period to send with each delete, if any.
    pub fn grace_period_override(&self) -> Option<i64> {
        (self.grace_period_seconds >= 0).then_some(self.grace_period_seconds)
    }
}

/// Runs cordon, uncordon, and drain against one control plane.
pub struct NodeDrainer<'a, C: ?Sized> {
    client: &'a C,
    sink: &'a mut dyn StatusSink,
}

impl<'a, C> NodeDrainer<'a, C>
where
    C: ControlPlane + ?Sized,
{
    pub fn new(client: &'a C, sink: &'a mut dyn StatusSink) -> Self {
        Self { client, sink }
    }

    /// Mark the node unschedulable.
    pub fn cordon(&mut self, info: &mut ResourceInfo) -> DrainResult<ToggleOutcome> {
        set_schedulability(self.client, info, true, self.sink)
    }

    /// Mark the node schedulable.
    pub fn uncordon(&mut self, info: &mut ResourceInfo) -> DrainResult<ToggleOutcome> {
        set_schedulability(self.client, info, false, self.sink)
    }

    /// Cordon the node, then delete every workload the eviction policy
    /// approves. Returns the number of workloads deleted.
    pub fn drain(&mut self, info: &mut ResourceInfo, options: DrainOptions) -> DrainResult<usize> {
        self.cordon(info)?;

        let policy = EvictionPolicy::new(self.client, options.force);
        let classification = policy.classify(&info.name, self.sink)?;

        let grace = options.grace_period_override();
        for workload in &classification.approved {
            self.client
                .delete_workload(&workload.namespace, &workload.name, grace)?;
            debug!(
                namespace = %workload.namespace,
                workload = %workload.name,
                ?grace,
                "workload deleted"
            );
            self.sink.success("workload", &workload.name, "deleted")?;
        }

        info!(
            node = %info.name,
            deleted = classification.approved.len(),
            "node drained"
        );
        self.sink.success(info.kind.as_str(), &info.name, "drained")?;
        Ok(classification.approved.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrainError;
    use crate::report::MemorySink;
    use crate::resolve::resolve;
    use crate::testing::*;
    use warpgrid_state::{ControllerKind, StateStore};

    /// Node `foo` with a mirror workload, one owned by live ReplicationGroup
    /// `rg1`, and one with no owner.
    fn mixed_node() -> FaultyPlane {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&node("foo", false)).unwrap();
        let rg = controller(ControllerKind::ReplicationGroup, "rg1");
        store.put_controller(&rg).unwrap();
        store.put_workload(&mirror(workload("kube", "etcd-foo", "foo"))).unwrap();
        store.put_workload(&owned_by(workload("default", "rg1-abcde", "foo"), &rg)).unwrap();
        store.put_workload(&workload("default", "scratch", "foo")).unwrap();
        FaultyPlane::new(store)
    }

    fn run_drain(plane: &FaultyPlane, options: DrainOptions) -> (DrainResult<usize>, MemorySink) {
        let mut sink = MemorySink::new();
        let mut info = resolve(plane, "foo", "default").unwrap();
        let result = NodeDrainer::new(plane, &mut sink).drain(&mut info, options);
        (result, sink)
    }

    #[test]
    fn grace_override_only_when_non_negative() {
        assert_eq!(DrainOptions::default().grace_period_override(), None);
        let options = DrainOptions { force: false, grace_period_seconds: 0 };
        assert_eq!(options.grace_period_override(), Some(0));
        let options = DrainOptions { force: false, grace_period_seconds: 900 };
        assert_eq!(options.grace_period_override(), Some(900));
    }

    #[test]
    fn drain_without_force_blocks_before_any_delete() {
        let plane = mixed_node();
        let (result, sink) = run_drain(&plane, DrainOptions::default());

        let err = result.unwrap_err();
        assert!(matches!(err, DrainError::UnmanagedWorkloads(ref n) if n == "scratch"));
        assert!(plane.deletes.borrow().is_empty());
        assert!(plane.store.get_node("foo").unwrap().unwrap().unschedulable);
        assert_eq!(sink.verbs_for("node", "foo"), vec!["cordoned"]);
    }

    #[test]
    fn drain_with_force_deletes_all_but_mirror() {
        let plane = mixed_node();
        let options = DrainOptions { force: true, ..DrainOptions::default() };
        let (result, sink) = run_drain(&plane, options);

        assert_eq!(result.unwrap(), 2);
        assert_eq!(plane.deleted_names(), vec!["rg1-abcde", "scratch"]);
        assert!(plane.store.get_workload("kube", "etcd-foo").unwrap().is_some());
        assert!(plane.store.get_node("foo").unwrap().unwrap().unschedulable);

        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].ends_with(": scratch"));
        assert_eq!(sink.verbs_for("workload", "rg1-abcde"), vec!["deleted"]);
        assert_eq!(sink.verbs_for("workload", "scratch"), vec!["deleted"]);
        assert_eq!(sink.verbs_for("node", "foo"), vec!["cordoned", "drained"]);
    }

    #[test]
    fn drain_passes_grace_override_to_every_delete() {
        let plane = mixed_node();
        let options = DrainOptions { force: true, grace_period_seconds: 0 };
        run_drain(&plane, options).0.unwrap();

        assert!(plane.deletes.borrow().iter().all(|(_, _, g)| *g == Some(0)));
        // Zero grace removes the workloads outright.
        assert!(plane.store.get_workload("default", "scratch").unwrap().is_none());
    }

    #[test]
    fn drain_negative_grace_uses_workload_default() {
        let plane = mixed_node();
        let options = DrainOptions { force: true, grace_period_seconds: -1 };
        run_drain(&plane, options).0.unwrap();

        assert!(plane.deletes.borrow().iter().all(|(_, _, g)| g.is_none()));
        let scratch = plane.store.get_workload("default", "scratch").unwrap().unwrap();
        assert_eq!(scratch.deletion.unwrap().grace_period_seconds, 30);
    }

    #[test]
    fn delete_failure_stops_without_rollback() {
        let plane = mixed_node();
        plane.fail_delete_of("scratch", "quota exceeded");
        let options = DrainOptions { force: true, grace_period_seconds: 0 };
        let (result, sink) = run_drain(&plane, options);

        assert_eq!(result.unwrap_err().to_string(), "write error: quota exceeded");
        assert_eq!(plane.deleted_names(), vec!["rg1-abcde"]);
        assert!(plane.store.get_workload("default", "rg1-abcde").unwrap().is_none());
        assert!(plane.store.get_node("foo").unwrap().unwrap().unschedulable);
        assert_eq!(sink.verbs_for("node", "foo"), vec!["cordoned"]);
    }

    #[test]
    fn cordon_failure_stops_drain() {
        let plane = mixed_node();
        plane.fail_replace("connection reset");
        let options = DrainOptions { force: true, ..DrainOptions::default() };
        let (result, _) = run_drain(&plane, options);

        assert!(result.is_err());
        assert!(plane.deletes.borrow().is_empty());
    }

    #[test]
    fn malformed_reference_aborts_drain_with_zero_deletes() {
        let plane = mixed_node();
        plane
            .store
            .put_workload(&with_created_by(workload("default", "broken", "foo"), "not-json"))
            .unwrap();
        let options = DrainOptions { force: true, ..DrainOptions::default() };
        let (result, _) = run_drain(&plane, options);

        assert!(matches!(result, Err(DrainError::Decode { .. })));
        assert!(plane.deletes.borrow().is_empty());
    }

    #[test]
    fn drain_already_cordoned_node() {
        let plane = mixed_node();
        let mut node = plane.store.get_node("foo").unwrap().unwrap();
        node.unschedulable = true;
        plane.store.put_node(&node).unwrap();

        let options = DrainOptions { force: true, ..DrainOptions::default() };
        let (result, sink) = run_drain(&plane, options);

        assert_eq!(result.unwrap(), 2);
        assert_eq!(plane.replace_calls.get(), 0);
        assert_eq!(
            sink.verbs_for("node", "foo"),
            vec!["already cordoned", "drained"]
        );
    }

    #[test]
    fn cordon_and_uncordon_entry_points() {
        let plane = mixed_node();
        let mut sink = MemorySink::new();
        let mut info = resolve(&plane, "foo", "default").unwrap();
        let mut drainer = NodeDrainer::new(&plane, &mut sink);

        assert_eq!(drainer.cordon(&mut info).unwrap(), ToggleOutcome::Changed);
        assert_eq!(drainer.uncordon(&mut info).unwrap(), ToggleOutcome::Changed);
        assert_eq!(drainer.uncordon(&mut info).unwrap(), ToggleOutcome::NoOp);
        assert!(plane.deletes.borrow().is_empty());
        assert_eq!(
            sink.verbs_for("node", "foo"),
            vec!["cordoned", "uncordoned", "already uncordoned"]
        );
    }
}
