use std::sync::Arc;
use std::time::Duration;

use crate::cache::{cache_key, CacheStats, QueryCache};
use crate::error::StoreError;
use crate::filters::vocab::{disk_type_options, ram_options, storage_range_options};
use crate::filters::{validate, NormalizedQuery, RawQuery};
use crate::models::{CatalogRecord, FilterOptions, ListingDraft, NaturalKey, QueryResult, UpsertOutcome};
use crate::store::CatalogStore;

/// The catalog as seen by callers: a store behind a read-through query cache.
///
/// All writes go through here so the cache is cleared whenever the store changes.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Arc<QueryCache>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: Arc::new(QueryCache::new(cache_ttl)),
        }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Run a normalised query, served from cache when possible.
    pub fn query(&self, query: &NormalizedQuery) -> Arc<QueryResult> {
        let key = cache_key(query);
        self.cache.page_or_insert_with(&key, || {
            self.store
                .query(&query.filters, &query.sort, query.page, query.limit)
        })
    }

    /// Validate untrusted parameters, then query. Returns the normalised form too.
    pub fn search(&self, raw: &RawQuery) -> (NormalizedQuery, Arc<QueryResult>) {
        let query = validate(raw);
        let result = self.query(&query);
        (query, result)
    }

    pub fn find_by_id(&self, id: u64) -> Option<CatalogRecord> {
        self.store.find_by_id(id)
    }

    pub fn find_by_natural_key(&self, key: &NaturalKey) -> Option<CatalogRecord> {
        self.store.find_by_natural_key(key)
    }

    pub fn locations(&self) -> Arc<Vec<String>> {
        self.cache
            .locations_or_insert_with(|| self.store.distinct_locations())
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            storage_ranges: storage_range_options(),
            ram_options: ram_options(),
            disk_types: disk_type_options(),
            locations: self.locations().as_ref().clone(),
        }
    }

    pub fn upsert(&self, draft: ListingDraft) -> Result<UpsertOutcome, StoreError> {
        let outcome = self.store.upsert(draft);
        self.cache.invalidate_all();
        outcome
    }

    /// Upsert a batch under a single store write, then clear the cache.
    pub fn upsert_batch(&self, drafts: Vec<ListingDraft>) -> Vec<Result<UpsertOutcome, StoreError>> {
        if drafts.is_empty() {
            return Vec::new();
        }
        let outcomes = self.store.upsert_batch(drafts);
        self.cache.invalidate_all();
        outcomes
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawListing;
    use crate::store::InMemoryCatalogStore;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryCatalogStore::new()), Duration::from_secs(3600))
    }

    fn draft(model: &str, location: &str, ram: &str) -> ListingDraft {
        ListingDraft::parse(&RawListing {
            model: model.into(),
            ram: ram.into(),
            hdd: "2x2TBSATA2".into(),
            location: location.into(),
            price: "49.99".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_write_invalidates_cached_query() {
        let svc = service();
        svc.upsert(draft("A", "AMS", "16GBDDR3")).unwrap();

        let (_, first) = svc.search(&RawQuery::from_pairs([("ram", "16GB")]));
        assert_eq!(first.total(), 1);

        svc.upsert_batch(vec![draft("B", "AMS", "16GBDDR3")]);
        let (_, second) = svc.search(&RawQuery::from_pairs([("ram", "16GB")]));
        assert_eq!(second.total(), 2);
    }

    #[test]
    fn test_reordered_queries_share_a_cache_entry() {
        let svc = service();
        svc.upsert(draft("A", "AMS", "16GBDDR3")).unwrap();
        let (_, a) = svc.search(&RawQuery::from_pairs([("ram", "16GB"), ("location", "AMS")]));
        let (_, b) = svc.search(&RawQuery::from_pairs([("location", "AMS"), ("ram", "16GB")]));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(svc.cache_stats().hits, 1);
    }

    #[test]
    fn test_filter_options_include_locations() {
        let svc = service();
        svc.upsert_batch(vec![draft("A", "Singapore", "8GB"), draft("B", "Amsterdam", "8GB")]);
        let options = svc.filter_options();
        assert_eq!(options.storage_ranges.len(), 12);
        assert_eq!(options.ram_options.len(), 11);
        assert_eq!(options.disk_types, vec!["SAS", "SATA", "SSD"]);
        assert_eq!(options.locations, vec!["Amsterdam", "Singapore"]);

        svc.upsert(draft("C", "Dallas", "8GB")).unwrap();
        assert_eq!(svc.locations().len(), 3);
    }
}
