//! Cluster metadata held by the master
//!
//! This module contains:
//! - Region membership snapshots and the key hash
//! - The primary-key cache
//! - Membership registries and the watcher that keeps the state current

pub mod membership;
pub mod pk_cache;
pub mod registry;

use std::sync::{Arc, PoisonError, RwLock};

pub use membership::{key_hash, slot_for_key, Membership, Region};
pub use pk_cache::PrimaryKeyCache;
pub use registry::{DirectoryRegistry, Registration, Registry, StaticRegistry};

/// Routing metadata shared by every master connection.
///
/// Both maps are replaced wholesale on write, so a reader holding a
/// snapshot never observes a half-applied change.
#[derive(Debug, Default)]
pub struct ClusterState {
    membership: RwLock<Arc<Membership>>,
    primary_keys: RwLock<Arc<PrimaryKeyCache>>,
}

impl ClusterState {
    /// Create state with no regions and an empty key cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state with a fixed initial membership
    pub fn with_membership(membership: Membership) -> Self {
        Self {
            membership: RwLock::new(Arc::new(membership)),
            primary_keys: RwLock::default(),
        }
    }

    /// Current membership snapshot
    pub fn snapshot(&self) -> Arc<Membership> {
        let guard = self.membership.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the membership; returns `false` when nothing changed
    pub fn replace_regions(&self, membership: Membership) -> bool {
        let mut guard = self.membership.write().unwrap_or_else(PoisonError::into_inner);
        if **guard == membership {
            return false;
        }
        *guard = Arc::new(membership);
        true
    }

    /// Record the primary-key column of `table`
    pub fn register_primary_key(&self, table: &str, column: &str) {
        let mut guard = self
            .primary_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(guard.with_entry(table, column));
    }

    /// Cached primary-key column of `table`
    pub fn primary_key_for(&self, table: &str) -> Option<String> {
        let guard = self
            .primary_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(table).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_stable_across_replace() {
        let state = ClusterState::with_membership(Membership::from_entries([("r1", "a:1")]));
        let before = state.snapshot();

        assert!(state.replace_regions(Membership::from_entries([("r1", "a:1"), ("r2", "b:2")])));

        assert_eq!(before.names(), vec!["r1"]);
        assert_eq!(state.snapshot().names(), vec!["r1", "r2"]);
    }

    #[test]
    fn test_replace_reports_change() {
        let state = ClusterState::new();
        assert!(state.snapshot().is_empty());

        let membership = Membership::from_entries([("r1", "a:1")]);
        assert!(state.replace_regions(membership.clone()));
        assert!(!state.replace_regions(membership));
    }

    #[test]
    fn test_primary_key_registration() {
        let state = ClusterState::new();
        assert_eq!(state.primary_key_for("users"), None);

        state.register_primary_key("users", "id");
        state.register_primary_key("orders", "order_id");
        state.register_primary_key("users", "uid");

        assert_eq!(state.primary_key_for("users").as_deref(), Some("uid"));
        assert_eq!(state.primary_key_for("orders").as_deref(), Some("order_id"));
    }
}
