//! warpgrid-state — embedded state store for WarpGrid.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! state management for nodes, the workloads placed on them, and the
//! controllers (ReplicationGroup, Job, DaemonSet) that own those workloads.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Namespaced objects use composite `{namespace}/{name}` keys; controllers
//! get one table per kind so an existence check is a single point lookup.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared freely.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
