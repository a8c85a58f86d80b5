use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warp_core::WarpConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "warp",
    about = "WarpGrid — node maintenance",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to warp.toml (default: ./warp.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// State database to operate on (overrides [state].path)
    #[arg(long, global = true)]
    state: Option<PathBuf>,
    /// Namespace for namespaced resources (overrides [cli].namespace)
    #[arg(short, long, global = true)]
    namespace: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark node as unschedulable.
    ///
    /// Example: warp cordon foo
    Cordon {
        /// Node name, or TYPE/NAME
        node: String,
    },
    /// Mark node as schedulable.
    ///
    /// Example: warp uncordon foo
    Uncordon {
        /// Node name, or TYPE/NAME
        node: String,
    },
    /// Drain node in preparation for maintenance.
    ///
    /// The node is marked unschedulable to prevent new workloads from
    /// arriving. Then every workload on it is deleted except mirror
    /// workloads, which cannot be deleted through the control plane. If any
    /// workload is managed by neither a ReplicationGroup, nor a Job, nor a
    /// DaemonSet, nothing is deleted unless --force is given.
    ///
    /// Use `warp uncordon` to put the node back into service.
    Drain {
        /// Node name, or TYPE/NAME
        node: String,
        /// Continue even if there are workloads not managed by a
        /// ReplicationGroup, Job, or DaemonSet.
        #[arg(long)]
        force: bool,
        /// Seconds given to each workload to terminate gracefully. If
        /// negative, the workload's own default is used. [default: -1]
        #[arg(long, allow_negative_numbers = true)]
        grace_period: Option<i64>,
    },
    /// List nodes and whether they accept new workloads.
    Nodes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = WarpConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log.filter))?,
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context::open(config, cli.state, cli.namespace)?;
    let out = std::io::stdout().lock();

    match cli.command {
        Commands::Cordon { node } => commands::maintenance::cordon(&ctx, &node, out),
        Commands::Uncordon { node } => commands::maintenance::uncordon(&ctx, &node, out),
        Commands::Drain {
            node,
            force,
            grace_period,
        } => commands::maintenance::drain(&ctx, &node, force, grace_period, out),
        Commands::Nodes => commands::nodes::list(&ctx, out),
    }
}
