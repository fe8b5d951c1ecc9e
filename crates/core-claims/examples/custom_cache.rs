//! # Custom Cache Example
//!
//! Demonstrates how to plug your own parse cache into the checker by
//! implementing the `ClaimCache` trait.
//!
//! ## Run
//!
//! ```bash
//! cargo run -p core-claims --example custom_cache
//! ```

use core_claims::{permissions, CacheEntry, ClaimCache, PermissionsChecker};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// ============================================================================
// BOUNDED CACHE: evicts the oldest key once full
// ============================================================================

struct BoundedCache {
    capacity: usize,
    state: Mutex<(HashMap<String, CacheEntry>, VecDeque<String>)>,
}

impl BoundedCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new((HashMap::new(), VecDeque::new())),
        }
    }

    fn keys(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.1.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl ClaimCache for BoundedCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.state.lock().ok()?.0.get(key).cloned()
    }

    fn set(&self, key: String, entry: CacheEntry) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let (entries, order) = &mut *state;

        if entries.insert(key.clone(), entry).is_none() {
            order.push_back(key);
            if order.len() > self.capacity {
                if let Some(oldest) = order.pop_front() {
                    entries.remove(&oldest);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "BoundedCache"
    }
}

fn main() -> Result<(), core_claims::ClaimsError> {
    let model = permissions(|schema| {
        schema
            .token_with("admin", |t| t.includes("role:editor"))
            .composite("role", |c| {
                c.token_with("editor", |t| t.includes("role:viewer"))
                    .token("viewer")
            })
    })?;

    let cache = Arc::new(BoundedCache::new(3));
    let checker = PermissionsChecker::new(model).with_cache(cache.clone());
    println!("Checker: {checker:?}");

    for (authorization, assertion) in [
        ("admin", "role:viewer"),
        ("role:viewer", "role:editor"),
        ("role:editor", "role:*"),
        ("admin", "role:viewer"),
    ] {
        let result = checker.test(authorization, assertion)?;
        println!("{authorization:>12} vs {assertion:<12} -> {result}");
    }

    println!("\nCached keys (oldest first):");
    for key in cache.keys() {
        println!("  {key}");
    }

    Ok(())
}
