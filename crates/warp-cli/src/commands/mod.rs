pub mod maintenance;
pub mod nodes;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use tracing::debug;
use warp_core::WarpConfig;
use warpgrid_state::StateStore;

/// Everything a command needs: the opened store and resolved settings.
pub struct Context {
    pub store: StateStore,
    pub namespace: String,
    pub config: WarpConfig,
}

impl Context {
    /// Open the state database named by `state` or, failing that, the config.
    ///
    /// The database must already exist; commands never create cluster state.
    pub fn open(
        config: WarpConfig,
        state: Option<PathBuf>,
        namespace: Option<String>,
    ) -> anyhow::Result<Self> {
        let path = state.unwrap_or_else(|| config.state.path.clone());
        let store = open_existing(&path)?;
        let namespace = namespace.unwrap_or_else(|| config.cli.namespace.clone());
        debug!(path = %path.display(), %namespace, "command context ready");
        Ok(Self {
            store,
            namespace,
            config,
        })
    }
}

fn open_existing(path: &Path) -> anyhow::Result<StateStore> {
    if !path.is_file() {
        bail!("state database not found at {}", path.display());
    }
    StateStore::open(path)
        .with_context(|| format!("failed to open state database at {}", path.display()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::{BTreeMap, HashMap};

    use warpgrid_state::*;

    use super::Context;

    /// A context over a fresh on-disk store. Keep the tempdir alive.
    pub fn context() -> (tempfile::TempDir, Context) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warpgrid.redb");
        StateStore::open(&path).unwrap();
        let ctx = Context::open(Default::default(), Some(path), None).unwrap();
        (dir, ctx)
    }

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

    pub fn workload(name: &str, node_name: &str) -> WorkloadInstance {
        WorkloadInstance {
            namespace: "default".to_string(),
            name: name.to_string(),
            node_name: node_name.to_string(),
            annotations: BTreeMap::new(),
            termination_grace_period_seconds: 30,
            deletion: None,
            created_at: 1000,
        }
    }
}
