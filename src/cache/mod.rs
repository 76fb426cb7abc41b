//! Read-through cache for catalog query results.
//!
//! Entries expire after a fixed TTL and are dropped all at once whenever the
//! catalog is written. The whole entry map is swapped under the write lock,
//! so readers see either the pre-clear or the post-clear state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::filters::{query_signature, NormalizedQuery};
use crate::models::QueryResult;

pub const LOCATIONS_CACHE_KEY: &str = "catalog:locations";
const QUERY_KEY_PREFIX: &str = "catalog:servers:";

/// Deterministic cache key for a normalised query.
pub fn cache_key(query: &NormalizedQuery) -> String {
    let digest = Sha256::digest(query_signature(query).as_bytes());
    format!("{}{}", QUERY_KEY_PREFIX, hex::encode(digest))
}

#[derive(Clone, Debug)]
enum CachedValue {
    Page(Arc<QueryResult>),
    Locations(Arc<Vec<String>>),
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedValue,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Bumped on every invalidation; values computed under an older
    /// generation are discarded instead of stored.
    generation: u64,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached page for `key`, computing and storing it on a miss.
    pub fn page_or_insert_with(&self, key: &str, compute: impl FnOnce() -> QueryResult) -> Arc<QueryResult> {
        let generation = match self.lookup(key) {
            Lookup::Hit(CachedValue::Page(page)) => return page,
            Lookup::Hit(_) => self.generation(),
            Lookup::Miss(generation) => generation,
        };
        let page = Arc::new(compute());
        self.store(key, CachedValue::Page(page.clone()), generation);
        page
    }

    /// Return the cached location list, computing and storing it on a miss.
    pub fn locations_or_insert_with(&self, compute: impl FnOnce() -> Vec<String>) -> Arc<Vec<String>> {
        let generation = match self.lookup(LOCATIONS_CACHE_KEY) {
            Lookup::Hit(CachedValue::Locations(locations)) => return locations,
            Lookup::Hit(_) => self.generation(),
            Lookup::Miss(generation) => generation,
        };
        let locations = Arc::new(compute());
        self.store(LOCATIONS_CACHE_KEY, CachedValue::Locations(locations.clone()), generation);
        locations
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read()
            .entries
            .get(key)
            .is_some_and(|e| e.inserted_at.elapsed() < self.ttl)
    }

    /// Drop every entry atomically with respect to readers.
    pub fn invalidate_all(&self) {
        let mut state = self.write();
        let dropped = state.entries.len();
        state.entries = HashMap::new();
        state.generation += 1;
        tracing::debug!(dropped, generation = state.generation, "Query cache invalidated");
    }

    /// Remove expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.write();
        let before = state.entries.len();
        let ttl = self.ttl;
        state.entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        before - state.entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lookup(&self, key: &str) -> Lookup {
        let state = self.read();
        match state.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "Query cache hit");
                Lookup::Hit(entry.value.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "Query cache miss");
                Lookup::Miss(state.generation)
            }
        }
    }

    fn store(&self, key: &str, value: CachedValue, generation: u64) {
        let mut state = self.write();
        if state.generation != generation {
            return;
        }
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn generation(&self) -> u64 {
        self.read().generation
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

enum Lookup {
    Hit(CachedValue),
    Miss(u64),
}
