//! Region membership
//!
//! A [`Membership`] is an immutable, name-sorted view of the live regions.
//! The master takes one snapshot per request and routes against it.

use std::fmt;

/// A live region node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Region name, unique within the cluster
    pub name: String,
    /// `host:port` the region listens on
    pub address: String,
}

impl Region {
    /// Create a new region entry
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.address)
    }
}

/// Name-sorted set of regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    regions: Vec<Region>,
}

impl Membership {
    /// Build a membership from `(name, address)` entries.
    ///
    /// Entries are sorted by name; a repeated name keeps its last address.
    pub fn from_entries<I, N, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: Into<String>,
    {
        let mut regions: Vec<Region> = Vec::new();
        for (name, address) in entries {
            let region = Region::new(name, address);
            match regions.iter_mut().find(|r| r.name == region.name) {
                Some(existing) => existing.address = region.address,
                None => regions.push(region),
            }
        }
        regions.sort_by(|a, b| a.name.cmp(&b.name));

        Self { regions }
    }

    /// Regions in name order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region names in order
    pub fn names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    /// Look up a region by name
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if there are no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region owning `key`, or `None` when the membership is empty
    pub fn region_for_key(&self, key: &str) -> Option<&Region> {
        if self.regions.is_empty() {
            return None;
        }
        self.regions.get(slot_for_key(key, self.regions.len()))
    }
}

/// 32-bit polynomial string hash (`h = h * 31 + c`, wrapping)
pub fn key_hash(key: &str) -> i32 {
    key.chars()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32))
}

/// Slot index of `key` among `slots` targets; `slots` must be non-zero
pub fn slot_for_key(key: &str, slots: usize) -> usize {
    // unsigned_abs maps i32::MIN to 2^31 instead of overflowing
    key_hash(key).unsigned_abs() as usize % slots
}
