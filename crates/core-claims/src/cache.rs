//! # Parse cache
//!
//! Pluggable memoization of parsed claim strings. The checker stores each
//! parsed collection under `"{kind}/{raw}"` together with a flag telling
//! whether it has already been validated against the model.
//!
//! The cache is injected into a [`crate::PermissionsChecker`], never global.
//! Implementations provide their own synchronization; the checker does a plain
//! get-then-set, so two threads parsing the same new string may both do the
//! work. Both compute the same immutable value.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use core_claims::{MemoryCache, PermissionsChecker};
//!
//! let cache = Arc::new(MemoryCache::new());
//! let checker = PermissionsChecker::unconstrained().with_cache(cache.clone());
//!
//! assert!(checker.can("read write", "write").unwrap());
//! assert!(checker.can("read write", "read").unwrap());
//!
//! // "read write" parsed once, each assertion once
//! assert_eq!(cache.len(), 3);
//! ```

use crate::claims::{Assertion, Authorization, Grants};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A cached claim collection of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum CachedClaims {
    /// Parsed authorization string
    Authorization(Arc<Authorization>),
    /// Parsed assertion string
    Assertion(Arc<Assertion>),
    /// Parsed grants string
    Grants(Arc<Grants>),
}

/// Cache value: the parsed collection and whether it passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Parsed (and, if `validated`, consolidated) collection
    pub claims: CachedClaims,
    /// Whether `claims` has been validated against the checker's model
    pub validated: bool,
}

/// Synchronous key-value store used to memoize parses
pub trait ClaimCache: Send + Sync {
    /// Look up an entry
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Insert or replace an entry
    fn set(&self, key: String, entry: CacheEntry);

    /// Returns the name of the cache implementation
    fn name(&self) -> &str {
        "ClaimCache"
    }
}

/// Unbounded in-process cache backed by a `HashMap`
///
/// There is no eviction; entries live as long as the cache. A poisoned lock
/// behaves as an empty cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates a new empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    /// Removes all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl ClaimCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: String, entry: CacheEntry) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, entry);
        }
    }

    fn name(&self) -> &str {
        "MemoryCache"
    }
}
