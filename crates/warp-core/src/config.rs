//! warp.toml configuration parser.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults below, and command-line flags override whatever is loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the control-plane state database.
pub const DEFAULT_STATE_PATH: &str = "/var/lib/warpgrid/warpgrid.redb";

/// Namespace used to resolve namespaced resources given without one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Tracing filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warp=warn";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WarpConfig {
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub cli: CliConfig,
    #[serde(default)]
    pub drain: DrainConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateConfig {
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    pub namespace: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Defaults for `warp drain`.
///
/// Deleting unmanaged workloads is only ever enabled by `--force`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrainConfig {
    /// Grace period in seconds; negative means the workload's own default.
    #[serde(default = "default_grace_period")]
    pub grace_period: i64,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            grace_period: default_grace_period(),
        }
    }
}

fn default_grace_period() -> i64 {
    -1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl WarpConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WarpConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if given, else `./warp.toml` when it exists, else defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new("warp.toml");
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
