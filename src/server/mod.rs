//! TCP servers for RegionDB
//!
//! This module contains the line transport shared by every hop, the
//! master and region servers, and their configuration.

pub mod config;
pub mod master;
pub mod region;
pub mod transport;

pub use config::{
    MasterConfig, RegionConfig, RegistrySource, DEFAULT_MASTER_PORT, DEFAULT_POLL_INTERVAL,
    DEFAULT_REGION_PORT, DEFAULT_REGISTRY_DIR,
};
pub use master::MasterServer;
pub use region::RegionServer;
pub use transport::{request, Framing};
