//! # Validator Cache
//!
//! Memoizes validator construction per `(ShapeId, MediaType)`.
//!
//! Handles are built outside any lock. When two callers race on the same
//! key, the first insert wins and the loser's handle is dropped; both
//! callers get the winning handle. A handle is never mutated after it is
//! built, so readers need no coordination beyond the map's own sharding.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use wirecheck_core::{ConfigError, MediaType, ShapeId};

use crate::backend::ValidatorHandle;

/// Cache key: the shape and the media type its validator reads.
pub type CacheKey = (ShapeId, MediaType);

/// Thread-safe memo of built validator handles.
#[derive(Default)]
pub struct ValidatorCache {
    handles: DashMap<CacheKey, Arc<dyn ValidatorHandle>>,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached handle for `key`, building it with `build` on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the error from `build`. Failed builds are not cached.
    pub fn get_or_build<F>(&self, key: CacheKey, build: F) -> Result<Arc<dyn ValidatorHandle>, ConfigError>
    where
        F: FnOnce() -> Result<Arc<dyn ValidatorHandle>, ConfigError>,
    {
        if let Some(handle) = self.handles.get(&key) {
            return Ok(Arc::clone(handle.value()));
        }

        let built = build()?;
        match self.handles.entry(key) {
            Entry::Occupied(existing) => {
                tracing::debug!(shape = %key.0, media_type = %key.1, "validator built concurrently; keeping first");
                Ok(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => {
                tracing::debug!(shape = %key.0, media_type = %key.1, "validator built");
                Ok(Arc::clone(slot.insert(built).value()))
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.handles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drop every cached handle.
    pub fn clear(&self) {
        self.handles.clear();
    }
}

impl std::fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorCache")
            .field("len", &self.handles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use wirecheck_core::{Outcome, PrimitiveType, ShapeArena};

    struct Fixed(bool);

    impl ValidatorHandle for Fixed {
        fn check(&self, _media_type: MediaType, _document: &str) -> Outcome {
            if self.0 {
                Outcome::conforming()
            } else {
                Outcome::rejected(Vec::new())
            }
        }
    }

    fn fixed(conforms: bool) -> Result<Arc<dyn ValidatorHandle>, ConfigError> {
        Ok(Arc::new(Fixed(conforms)))
    }

    fn key() -> CacheKey {
        let mut arena = ShapeArena::new();
        (arena.scalar(PrimitiveType::String).unwrap(), MediaType::Json)
    }

    #[test]
    fn test_builds_once() {
        let cache = ValidatorCache::new();
        let builds = AtomicUsize::new(0);
        for _ in 0..3 {
            let handle = cache
                .get_or_build(key(), || {
                    builds.fetch_add(1, Ordering::SeqCst);
                    fixed(true)
                })
                .unwrap();
            assert!(handle.check(MediaType::Json, "x").conforms);
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key()));
    }

    #[test]
    fn test_media_types_are_separate_entries() {
        let cache = ValidatorCache::new();
        let (shape, _) = key();
        cache
            .get_or_build((shape, MediaType::Json), || fixed(true))
            .unwrap();
        cache
            .get_or_build((shape, MediaType::Yaml), || fixed(false))
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_build_not_cached() {
        let cache = ValidatorCache::new();
        let result = cache.get_or_build(key(), || Err(ConfigError::InvalidConfig("boom".into())));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_builders_converge() {
        let cache = ValidatorCache::new();
        let builds = AtomicUsize::new(0);
        let barrier = Barrier::new(8);
        let (cache_ref, builds_ref, barrier_ref) = (&cache, &builds, &barrier);
        let handles: Vec<Arc<dyn ValidatorHandle>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        barrier_ref.wait();
                        cache_ref
                            .get_or_build(key(), || {
                                builds_ref.fetch_add(1, Ordering::SeqCst);
                                fixed(true)
                            })
                            .map_err(|e| e.to_string())
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|w| w.join().unwrap().unwrap())
                .collect()
        });
        assert_eq!(cache.len(), 1);
        assert!(builds.load(Ordering::SeqCst) >= 1);
        let first = &handles[0];
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, first)));
    }

    #[test]
    fn test_clear() {
        let cache = ValidatorCache::new();
        cache.get_or_build(key(), || fixed(true)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
