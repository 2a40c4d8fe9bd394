//! Server configuration
//!
//! Builder-style settings for the master and region servers.

use std::path::PathBuf;
use std::time::Duration;

/// Default master port
pub const DEFAULT_MASTER_PORT: u16 = 8888;

/// Default region port
pub const DEFAULT_REGION_PORT: u16 = 9001;

/// Default registry directory
pub const DEFAULT_REGISTRY_DIR: &str = "regiondb-registry";

/// Default registry poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where the master learns region membership from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// Poll a registry directory
    Directory(PathBuf),
    /// Fixed `(name, address)` list
    Static(Vec<(String, String)>),
}

/// Master server configuration
#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Membership source
    pub registry: RegistrySource,
    /// How often the registry is polled
    pub poll_interval: Duration,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_MASTER_PORT,
            registry: RegistrySource::Directory(PathBuf::from(DEFAULT_REGISTRY_DIR)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl MasterConfig {
    /// Create a new master config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the membership source
    pub fn registry(mut self, registry: RegistrySource) -> Self {
        self.registry = registry;
        self
    }

    /// Set the registry poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Region server configuration
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// Region name
    pub name: String,
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Address published to the registry; defaults to the bound address
    pub advertise: Option<String>,
    /// Registry directory
    pub registry_dir: PathBuf,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: "region1".to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_REGION_PORT,
            advertise: None,
            registry_dir: PathBuf::from(DEFAULT_REGISTRY_DIR),
        }
    }
}

impl RegionConfig {
    /// Create a new region config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the advertised address
    pub fn advertise(mut self, address: impl Into<String>) -> Self {
        self.advertise = Some(address.into());
        self
    }

    /// Set the registry directory
    pub fn registry_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.registry_dir = dir.into();
        self
    }

    /// Get the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
