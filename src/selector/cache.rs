//! Compiled selector cache
//!
//! Selectors are usually compiled from a handful of distinct strings, over
//! and over. The cache keeps the most recently used compilations keyed by
//! source, dialect and the identity of the reference resolver, if any.

use super::compiler::{ReferenceResolver, Selector, SelectorOptions};
use crate::config::Dialect;
use crate::error::SelectorError;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Source, dialect and resolver address
type CacheKey = (String, Dialect, Option<usize>);

struct CacheEntry {
    selector: Arc<Selector>,
    /// Holds the resolver so its address stays unique while keyed on
    _resolver: Option<Arc<dyn ReferenceResolver>>,
}

/// Thread-safe LRU cache of compiled selectors
///
/// Resolvers are told apart by identity: options sharing one
/// `Arc<dyn ReferenceResolver>` share entries, distinct resolvers never do.
pub struct SelectorCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl SelectorCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a cache holding at most `capacity` selectors (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        SelectorCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached compilation of `source` or compile and store it
    ///
    /// Failed compilations are not cached.
    pub fn get_or_compile(
        &self,
        source: &str,
        options: &SelectorOptions,
    ) -> Result<Arc<Selector>, SelectorError> {
        let resolver = options.reference_resolver.clone();
        let key = (
            source.to_string(),
            options.dialect,
            resolver
                .as_ref()
                .map(|r| Arc::as_ptr(r) as *const () as usize),
        );
        if let Some(entry) = self.lock().get(&key) {
            return Ok(Arc::clone(&entry.selector));
        }

        // compile outside the lock
        let selector = Arc::new(Selector::compile(source, options)?);
        self.lock().put(
            key,
            CacheEntry {
                selector: Arc::clone(&selector),
                _resolver: resolver,
            },
        );
        Ok(selector)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, CacheEntry>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_compilation() {
        let cache = SelectorCache::new(4);
        let options = SelectorOptions::new(Dialect::Html);
        let a = cache.get_or_compile("//div", &options).unwrap();
        let b = cache.get_or_compile("//div", &options).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_includes_dialect_and_resolver() {
        let cache = SelectorCache::new(4);
        let html = SelectorOptions::new(Dialect::Html);
        let xml = SelectorOptions::new(Dialect::Xml);
        let resolved = SelectorOptions::new(Dialect::Html).with_fragment_resolver();
        let a = cache.get_or_compile("p", &html).unwrap();
        let b = cache.get_or_compile("p", &xml).unwrap();
        let c = cache.get_or_compile("p", &resolved).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(c.render(), "(//p || //*[th:fragment='p' OR data-th-fragment='p'])");
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_distinct_resolvers_do_not_share_entries() {
        let cache = SelectorCache::new(4);
        let x = SelectorOptions::new(Dialect::Html)
            .with_resolver(|name: &str| format!("x='{name}'"));
        let y = SelectorOptions::new(Dialect::Html)
            .with_resolver(|name: &str| format!("y='{name}'"));
        let a = cache.get_or_compile("div", &x).unwrap();
        let b = cache.get_or_compile("div", &y).unwrap();
        assert_eq!(a.render(), "(//div || //*[x='div'])");
        assert_eq!(b.render(), "(//div || //*[y='div'])");
        assert_eq!(cache.len(), 2);

        // clones share the resolver and the entry
        let again = cache.get_or_compile("div", &x.clone()).unwrap();
        assert!(Arc::ptr_eq(&a, &again));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evicts_least_recent() {
        let cache = SelectorCache::new(2);
        let options = SelectorOptions::default();
        let first = cache.get_or_compile("a", &options).unwrap();
        cache.get_or_compile("b", &options).unwrap();
        cache.get_or_compile("c", &options).unwrap();
        assert_eq!(cache.len(), 2);
        let again = cache.get_or_compile("a", &options).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = SelectorCache::default();
        assert!(cache.get_or_compile("div[", &SelectorOptions::default()).is_err());
        assert!(cache.is_empty());
    }
}
