//! Checker behaviour with an injected parse cache

use core_claims::{
    permissions, Assertion, Authorization, CacheEntry, CachedClaims, ClaimCache, ClaimSet,
    ClaimsError, Grants, MemoryCache, PermissionsChecker,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn model_checker(cache: Arc<dyn ClaimCache>) -> PermissionsChecker {
    let model = permissions(|schema| {
        schema
            .token_with("admin", |t| t.alias("root").includes("read"))
            .token("read")
            .token("banned")
    })
    .unwrap();
    PermissionsChecker::new(model).with_cache(cache)
}

/// Counts calls, delegating storage to a `MemoryCache`
#[derive(Default)]
struct CountingCache {
    inner: MemoryCache,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl ClaimCache for CountingCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: String, entry: CacheEntry) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, entry);
    }

    fn name(&self) -> &str {
        "CountingCache"
    }
}

#[test]
fn test_keys_are_kind_prefixed() {
    let cache = Arc::new(MemoryCache::new());
    let checker = model_checker(cache.clone());

    assert!(checker.can("root", "read").unwrap());
    assert!(cache.contains("authorization/root"));
    assert!(cache.contains("assertion/read"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cached_entries_are_validated_and_consolidated() {
    let cache = Arc::new(MemoryCache::new());
    let checker = model_checker(cache.clone());
    checker.can("root read", "read").unwrap();

    let entry = cache.get("authorization/root read").unwrap();
    assert!(entry.validated);
    let auth = Authorization::from_cached(&entry.claims).unwrap();
    assert_eq!(auth.to_string(), "admin");
}

#[test]
fn test_validated_hit_skips_set() {
    let cache = Arc::new(CountingCache::default());
    let checker = model_checker(cache.clone());

    checker.can("admin", "read").unwrap();
    assert_eq!(cache.sets.load(Ordering::SeqCst), 2);

    checker.can("admin", "read").unwrap();
    assert_eq!(cache.gets.load(Ordering::SeqCst), 4);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 2);
}

#[test]
fn test_parse_stores_unvalidated_entry() {
    let cache = Arc::new(MemoryCache::new());
    let checker = model_checker(cache.clone());

    let parsed = checker.parse::<Authorization>("root").unwrap();
    assert_eq!(parsed.to_string(), "root");
    assert!(!cache.get("authorization/root").unwrap().validated);

    // first use validates and replaces the entry
    assert!(checker.can("root", "read").unwrap());
    let entry = cache.get("authorization/root").unwrap();
    assert!(entry.validated);
    assert_eq!(
        Authorization::from_cached(&entry.claims).unwrap().to_string(),
        "admin"
    );

    // later parses return the cached instance
    let again = checker.parse::<Authorization>("root").unwrap();
    assert_eq!(again.to_string(), "admin");
}

#[test]
fn test_unknown_tokens_not_cached_as_valid() {
    let cache = Arc::new(MemoryCache::new());
    let checker = model_checker(cache.clone());

    checker.parse::<Authorization>("ghost").unwrap();
    let result = checker.can("ghost", "read");
    assert!(matches!(result, Err(ClaimsError::InvalidClaim(_))));
    assert!(!cache.get("authorization/ghost").unwrap().validated);
}

#[test]
fn test_malformed_input_not_cached() {
    let cache = Arc::new(MemoryCache::new());
    let checker = model_checker(cache.clone());

    assert!(checker.can("a:b:c", "read").is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_kind_mismatch_is_a_miss() {
    let cache = Arc::new(MemoryCache::new());
    cache.set(
        "assertion/read".into(),
        CacheEntry {
            claims: CachedClaims::Grants(Arc::new(Grants::parse("admin>read").unwrap())),
            validated: true,
        },
    );
    let checker = model_checker(cache.clone());

    assert!(checker.can("read", "read").unwrap());
    let entry = cache.get("assertion/read").unwrap();
    assert!(Assertion::from_cached(&entry.claims).is_some());
}

#[test]
fn test_parsed_inputs_bypass_cache() {
    let cache = Arc::new(MemoryCache::new());
    let checker = model_checker(cache.clone());

    let auth = Authorization::parse("admin").unwrap();
    let required = Assertion::parse("read").unwrap();
    assert!(checker.can(&auth, &required).unwrap());
    assert!(cache.is_empty());
}

#[test]
fn test_debug_shows_cache_name() {
    let checker = model_checker(Arc::new(CountingCache::default()));
    assert!(format!("{checker:?}").contains("CountingCache"));
}
