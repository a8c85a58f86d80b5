//! Eviction policy — decides which workloads on a node may be deleted.
//!
//! A workload is *managed* when its created-by annotation names a
//! ReplicationGroup, Job, or DaemonSet that still exists. Managed workloads
//! are always deletable; their controller recreates them elsewhere.
//! Everything else is *unmanaged* and deletable only with `force`. Mirror
//! workloads are never touched.
//!
//! Any error from the controller lookup counts as "controller gone". A
//! transient control-plane failure therefore blocks a drain that would
//! otherwise succeed, rather than letting an ambiguous answer delete a
//! workload nobody will recreate.

use tracing::{debug, warn};
use warpgrid_state::{ControllerKind, SerializedReference, WorkloadInstance};

use crate::client::ControlPlane;
use crate::error::{DrainError, DrainResult};
use crate::report::StatusSink;

/// Per-workload outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionDecision {
    /// Mirror workload; neither deleted nor blocking.
    SkipMirror,
    /// Owned by a live controller.
    DeleteManaged,
    /// Unmanaged, deleted because `force` is set.
    DeleteForced,
    /// Unmanaged, blocks the drain.
    BlockUnmanaged,
}

/// Result of classifying every workload on a node.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Workloads to delete, in list order.
    pub approved: Vec<WorkloadInstance>,
    /// Names of unmanaged workloads, in list order.
    pub unmanaged: Vec<String>,
    /// Decision for every listed workload, keyed by `(namespace, name)`.
    pub decisions: Vec<((String, String), EvictionDecision)>,
}

impl Classification {
    pub fn decision(&self, namespace: &str, name: &str) -> Option<EvictionDecision> {
        self.decisions
            .iter()
            .find(|((ns, n), _)| ns == namespace && n == name)
            .map(|(_, decision)| *decision)
    }
}

/// Classifies the workloads on a node for deletion.
pub struct EvictionPolicy<'a, C: ?Sized> {
    client: &'a C,
    force: bool,
}

impl<'a, C> EvictionPolicy<'a, C>
where
    C: ControlPlane + ?Sized,
{
    pub fn new(client: &'a C, force: bool) -> Self {
        Self { client, force }
    }

    /// Classify every workload placed on `node_name`.
    ///
    /// Fails without a partial result if a created-by annotation cannot be
    /// decoded, or if unmanaged workloads exist and `force` is not set. With
    /// `force`, unmanaged workloads are approved and named in a warning.
    pub fn classify(&self, node_name: &str, sink: &mut dyn StatusSink) -> DrainResult<Classification> {
        let workloads = self.client.list_workloads_on_node(node_name)?;
        debug!(node = %node_name, count = workloads.len(), "classifying workloads");

        let mut classification = Classification::default();
        for workload in workloads {
            let decision = self.decide(&workload)?;
            classification.decisions.push((
                (workload.namespace.clone(), workload.name.clone()),
                decision,
            ));

            match decision {
                EvictionDecision::SkipMirror => {}
                EvictionDecision::DeleteManaged => classification.approved.push(workload),
                EvictionDecision::DeleteForced => {
                    classification.unmanaged.push(workload.name.clone());
                    classification.approved.push(workload);
                }
                EvictionDecision::BlockUnmanaged => {
                    classification.unmanaged.push(workload.name);
                }
            }
        }

        if !classification.unmanaged.is_empty() {
            let joined = classification.unmanaged.join(", ");
            if !self.force {
                return Err(DrainError::UnmanagedWorkloads(joined));
            }
            warn!(node = %node_name, workloads = %joined, "deleting unmanaged workloads");
            sink.warning(&format!(
                "About to delete these workloads managed by neither a ReplicationGroup, \
                 nor a Job, nor a DaemonSet: {joined}"
            ))?;
        }

        Ok(classification)
    }

    /// Decide the fate of one workload.
    pub fn decide(&self, workload: &WorkloadInstance) -> DrainResult<EvictionDecision> {
        if workload.is_mirror() {
            debug!(workload = %workload.name, "skipping mirror workload");
            return Ok(EvictionDecision::SkipMirror);
        }

        let managed = match workload.created_by() {
            Some(raw) => {
                let reference: SerializedReference =
                    serde_json::from_str(raw).map_err(|source| DrainError::Decode {
                        workload: workload.name.clone(),
                        source,
                    })?;
                self.controller_exists(&reference)
            }
            None => false,
        };

        Ok(match (managed, self.force) {
            (true, _) => EvictionDecision::DeleteManaged,
            (false, true) => EvictionDecision::DeleteForced,
            (false, false) => EvictionDecision::BlockUnmanaged,
        })
    }

    fn controller_exists(&self, reference: &SerializedReference) -> bool {
        let owner = &reference.reference;
        let Some(kind) = ControllerKind::from_kind(&owner.kind) else {
            debug!(kind = %owner.kind, name = %owner.name, "unrecognized owner kind");
            return false;
        };

        match self.client.get_controller(kind, &owner.namespace, &owner.name) {
            Ok(_) => true,
            Err(err) if err.is_not_found() => {
                debug!(%kind, namespace = %owner.namespace, name = %owner.name, "owner is gone");
                false
            }
            Err(err) => {
                warn!(
                    %kind,
                    namespace = %owner.namespace,
                    name = %owner.name,
                    error = %err,
                    "owner lookup failed, treating owner as absent"
                );
                false
            }
        }
    }
}
