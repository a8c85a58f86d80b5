//! warpgrid-drain — node maintenance for WarpGrid.
//!
//! Implements `cordon`, `uncordon`, and `drain` against any
//! [`ControlPlane`]:
//!
//! ```text
//! NodeDrainer::drain
//!   ├── set_schedulability(unschedulable = true)   0 or 1 node replace
//!   ├── EvictionPolicy::classify                   list + owner lookups
//!   │     mirror ─────────────► skipped
//!   │     live controller ────► approved
//!   │     anything else ──────► approved with force, blocking without
//!   └── delete approved workloads, one at a time, in list order
//! ```
//!
//! Everything runs synchronously on the caller's thread. Status lines go to
//! a [`StatusSink`]; diagnostics go to `tracing`.

pub mod client;
pub mod cordon;
pub mod drain;
pub mod error;
pub mod eviction;
pub mod report;
pub mod resolve;

#[cfg(test)]
mod testing;

pub use client::ControlPlane;
pub use cordon::{set_schedulability, ToggleOutcome};
pub use drain::{DrainOptions, NodeDrainer};
pub use error::{DrainError, DrainResult};
pub use eviction::{Classification, EvictionDecision, EvictionPolicy};
pub use report::{MemorySink, PrintSink, StatusEvent, StatusSink};
pub use resolve::{resolve, ResourceInfo, ResourceKind, ResourceObject};
