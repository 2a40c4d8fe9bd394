//! RegionDB - A sharded in-memory SQL-subset store
//!
//! This library provides the components of a small sharded store:
//! - SQL front end (lexer, parser, typed commands)
//! - Catalog and in-memory table storage for region nodes
//! - Region command executor
//! - Cluster metadata, registries and the master's router
//! - TCP servers for master and region nodes

pub mod catalog;
pub mod cluster;
pub mod error;
pub mod executor;
pub mod router;
pub mod server;
pub mod sql;
pub mod storage;

pub use error::{Error, Result};

/// Install the `tracing` subscriber used by the binaries.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
