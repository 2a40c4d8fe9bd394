//! Membership registries
//!
//! A registry lists the live regions as `name -> host:port` entries.
//! [`DirectoryRegistry`] keeps one file per region under a shared directory
//! and removes it again when the region's [`Registration`] is dropped.
//! [`StaticRegistry`] serves a fixed list given at startup.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ClusterState, Membership};
use crate::error::{Error, Result};

/// Source of region membership
pub trait Registry: Send + Sync + fmt::Debug {
    /// Current `(name, address)` entries
    fn entries(&self) -> Result<Vec<(String, String)>>;
}

/// Check that `address` looks like `host:port`
pub fn validate_address(address: &str) -> Result<()> {
    match address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(Error::InvalidAddress(address.to_string())),
    }
}

fn validate_region_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(Error::Registry(format!("invalid region name '{}'", name)))
    }
}

// ========== Directory Registry ==========

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Registry backed by a directory of `<region-name>` files
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    /// Open a registry rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Registry root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Publish `name -> address`; the entry lives until the guard drops
    pub fn register(&self, name: &str, address: &str) -> Result<Registration> {
        validate_region_name(name)?;
        validate_address(address)?;

        let path = self.root.join(name);
        // Write aside then link so readers never see a partial address.
        // Linking fails on an existing entry where a rename would replace it.
        let staging = self.root.join(format!(
            ".{}.{}.{}.tmp",
            name,
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&staging, address)?;
        let linked = fs::hard_link(&staging, &path);
        if let Err(err) = fs::remove_file(&staging) {
            warn!(path = ?staging, error = ?err, "failed to remove staging file");
        }
        match linked {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::Registry(format!(
                    "region '{}' is already registered",
                    name
                )));
            }
            Err(err) => return Err(err.into()),
        }

        info!(region = name, address, "registered region");
        Ok(Registration {
            name: name.to_string(),
            path,
        })
    }
}

impl Registry for DirectoryRegistry {
    fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let Some(name) = dir_entry.file_name().to_str().map(str::to_string) else {
                warn!(path = ?dir_entry.path(), "skipping registry entry with non-UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let address = match fs::read_to_string(dir_entry.path()) {
                Ok(address) => address.trim().to_string(),
                // Deregistered between listing and reading
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    warn!(region = %name, error = ?err, "skipping unreadable registry entry");
                    continue;
                }
            };

            if let Err(err) = validate_address(&address) {
                warn!(region = %name, error = %err, "skipping registry entry");
                continue;
            }
            entries.push((name, address));
        }

        Ok(entries)
    }
}

/// Live registration of one region; removes its entry on drop
#[derive(Debug)]
pub struct Registration {
    name: String,
    path: PathBuf,
}

impl Registration {
    /// Registered region name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(region = %self.name, "deregistered region"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(region = %self.name, error = ?err, "failed to deregister region"),
        }
    }
}

// ========== Static Registry ==========

/// Registry with a fixed set of regions
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: Vec<(String, String)>,
}

impl StaticRegistry {
    /// Create a registry from validated entries
    pub fn new(entries: Vec<(String, String)>) -> Result<Self> {
        for (name, address) in &entries {
            validate_region_name(name)?;
            validate_address(address)?;
        }
        Ok(Self { entries })
    }

    /// Parse a `name=host:port` entry
    pub fn parse_entry(entry: &str) -> Result<(String, String)> {
        let (name, address) = entry
            .split_once('=')
            .ok_or_else(|| Error::Registry(format!("expected NAME=HOST:PORT, got '{}'", entry)))?;
        let (name, address) = (name.trim(), address.trim());

        validate_region_name(name)?;
        validate_address(address)?;
        Ok((name.to_string(), address.to_string()))
    }
}

impl Registry for StaticRegistry {
    fn entries(&self) -> Result<Vec<(String, String)>> {
        Ok(self.entries.clone())
    }
}

// ========== Watcher ==========

/// Read the registry once and apply it; returns whether membership changed
pub fn refresh(registry: &dyn Registry, state: &ClusterState) -> Result<bool> {
    let membership = Membership::from_entries(registry.entries()?);
    let names: Vec<String> = membership.names().into_iter().map(String::from).collect();

    let changed = state.replace_regions(membership);
    if changed {
        info!(regions = ?names, "region membership changed");
    }
    Ok(changed)
}

/// Poll `registry` every `interval` and keep `state` current
pub fn spawn_watcher(
    registry: Arc<dyn Registry>,
    state: Arc<ClusterState>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // Directory reads block, keep them off the runtime workers
            let registry = Arc::clone(&registry);
            let state = Arc::clone(&state);
            let polled =
                tokio::task::spawn_blocking(move || refresh(registry.as_ref(), &state)).await;
            match polled {
                Ok(Ok(changed)) => debug!(changed, "polled region registry"),
                Ok(Err(err)) => warn!(error = ?err, "failed to read region registry"),
                Err(err) => warn!(error = ?err, "registry poll task failed"),
            }
        }
    })
}
