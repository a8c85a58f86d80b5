//! warp-core — shared configuration for WarpGrid tools.

pub mod config;

pub use config::WarpConfig;
