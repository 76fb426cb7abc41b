use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::query::run_query;
use super::snapshot::CatalogSnapshot;
use super::CatalogStore;
use crate::error::StoreError;
use crate::filters::{FilterSet, SortSpec};
use crate::models::{CatalogRecord, ListingDraft, NaturalKey, QueryResult, UpsertOutcome};

/// Thread-safe in-memory catalog backed by a `BTreeMap` keyed by id,
/// plus a natural-key index. Clone-friendly via `Arc`.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug)]
struct StoreInner {
    records: BTreeMap<u64, CatalogRecord>,
    by_key: HashMap<NaturalKey, u64>,
    next_id: u64,
}

impl Default for StoreInner {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            by_key: HashMap::new(),
            next_id: 1,
        }
    }
}

impl StoreInner {
    fn upsert(&mut self, draft: ListingDraft) -> UpsertOutcome {
        let now = Utc::now();
        let key = draft.natural_key();

        let existing = self.by_key.get(&key).copied();
        if let Some(record) = existing.and_then(|id| self.records.get_mut(&id)) {
            if draft.differs_from(record) {
                record.ram_raw = draft.ram_raw;
                record.ram_size_gb = draft.ram_size_gb;
                record.storage_total_gb = draft.storage_total_gb;
                record.disk_type = draft.disk_type;
                record.price_amount = draft.price_amount;
                record.currency = draft.currency;
                record.updated_at = now;
            }
            return UpsertOutcome::Updated { id: record.id };
        }

        let id = self.next_id;
        self.next_id += 1;
        self.records.insert(
            id,
            CatalogRecord {
                id,
                model: draft.model,
                ram_raw: draft.ram_raw,
                ram_size_gb: draft.ram_size_gb,
                storage_raw: draft.storage_raw,
                storage_total_gb: draft.storage_total_gb,
                disk_type: draft.disk_type,
                location: draft.location,
                price_amount: draft.price_amount,
                currency: draft.currency,
                created_at: now,
                updated_at: now,
            },
        );
        self.by_key.insert(key, id);
        UpsertOutcome::Created { id }
    }
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot. Fails on duplicate ids or natural keys.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, StoreError> {
        let mut inner = StoreInner::default();
        let mut max_id = 0;
        for record in snapshot.records {
            let key = record.natural_key();
            if inner.by_key.contains_key(&key) {
                return Err(StoreError::Storage(format!(
                    "duplicate natural key in snapshot: {} / {} / {}",
                    key.model, key.location, key.storage_raw
                )));
            }
            if inner.records.contains_key(&record.id) {
                return Err(StoreError::Storage(format!("duplicate id in snapshot: {}", record.id)));
            }
            max_id = max_id.max(record.id);
            inner.by_key.insert(key, record.id);
            inner.records.insert(record.id, record);
        }
        inner.next_id = snapshot.next_id.max(max_id + 1);
        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let inner = self.read();
        CatalogSnapshot {
            next_id: inner.next_id,
            records: inner.records.values().cloned().collect(),
        }
    }

    // Every critical section leaves the maps consistent, so a poisoned lock
    // still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn query(&self, filters: &FilterSet, sort: &SortSpec, page: u32, limit: u32) -> QueryResult {
        let inner = self.read();
        run_query(inner.records.values(), filters, sort, page, limit)
    }

    fn upsert(&self, draft: ListingDraft) -> Result<UpsertOutcome, StoreError> {
        Ok(self.write().upsert(draft))
    }

    fn upsert_batch(&self, drafts: Vec<ListingDraft>) -> Vec<Result<UpsertOutcome, StoreError>> {
        let mut inner = self.write();
        drafts.into_iter().map(|d| Ok(inner.upsert(d))).collect()
    }

    fn find_by_id(&self, id: u64) -> Option<CatalogRecord> {
        self.read().records.get(&id).cloned()
    }

    fn find_by_natural_key(&self, key: &NaturalKey) -> Option<CatalogRecord> {
        let inner = self.read();
        inner.by_key.get(key).and_then(|id| inner.records.get(id)).cloned()
    }

    fn distinct_locations(&self) -> Vec<String> {
        let inner = self.read();
        inner
            .records
            .values()
            .filter(|r| !r.location.is_empty())
            .map(|r| r.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn len(&self) -> usize {
        self.read().records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::NormalizedQuery;
    use crate::models::RawListing;

    fn draft(model: &str, location: &str, hdd: &str, price: &str) -> ListingDraft {
        ListingDraft::parse(&RawListing {
            model: model.into(),
            ram: "16GBDDR3".into(),
            hdd: hdd.into(),
            location: location.into(),
            price: price.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_upsert_creates_then_updates_in_place() {
        let store = InMemoryCatalogStore::new();
        let first = store.upsert(draft("HP DL120", "AMS", "2x2TBSATA2", "49.99")).unwrap();
        assert_eq!(first, UpsertOutcome::Created { id: 1 });

        let second = store.upsert(draft("HP DL120", "AMS", "2x2TBSATA2", "$59.99")).unwrap();
        assert_eq!(second, UpsertOutcome::Updated { id: 1 });
        assert_eq!(store.len(), 1);

        let record = store.find_by_id(1).unwrap();
        assert_eq!(record.price_amount.to_string(), "59.99");
        assert_eq!(record.currency, crate::models::Currency::Usd);
    }

    #[test]
    fn test_natural_key_distinguishes_storage_text() {
        let store = InMemoryCatalogStore::new();
        store.upsert(draft("HP DL120", "AMS", "2x2TBSATA2", "49.99")).unwrap();
        let other = store.upsert(draft("HP DL120", "AMS", "4x480GBSSD", "49.99")).unwrap();
        assert_eq!(other, UpsertOutcome::Created { id: 2 });
        assert!(store
            .find_by_natural_key(&NaturalKey::new("HP DL120", "AMS", "4x480GBSSD"))
            .is_some());
        assert!(store.find_by_natural_key(&NaturalKey::new("HP DL120", "FRA", "4x480GBSSD")).is_none());
        assert!(store.find_by_id(99).is_none());
    }

    #[test]
    fn test_unchanged_upsert_keeps_timestamp() {
        let store = InMemoryCatalogStore::new();
        store.upsert(draft("A", "AMS", "1x1TBSATA", "10")).unwrap();
        let before = store.find_by_id(1).unwrap().updated_at;
        store.upsert(draft("A", "AMS", "1x1TBSATA", "10")).unwrap();
        assert_eq!(store.find_by_id(1).unwrap().updated_at, before);
    }

    #[test]
    fn test_distinct_locations_sorted() {
        let store = InMemoryCatalogStore::new();
        store.upsert(draft("A", "Singapore", "1x1TBSATA", "10")).unwrap();
        store.upsert(draft("B", "Amsterdam", "1x1TBSATA", "10")).unwrap();
        store.upsert(draft("C", "Singapore", "1x1TBSATA", "10")).unwrap();
        store.upsert(draft("D", "", "1x1TBSATA", "10")).unwrap();
        assert_eq!(store.distinct_locations(), vec!["Amsterdam", "Singapore"]);
    }

    #[test]
    fn test_snapshot_round_trip_never_reuses_ids() {
        let store = InMemoryCatalogStore::new();
        store.upsert(draft("A", "AMS", "1x1TBSATA", "10")).unwrap();
        store.upsert(draft("B", "AMS", "1x1TBSATA", "10")).unwrap();
        let mut snapshot = store.snapshot();
        snapshot.records.retain(|r| r.id == 1);

        let restored = InMemoryCatalogStore::from_snapshot(snapshot).unwrap();
        let outcome = restored.upsert(draft("C", "AMS", "1x1TBSATA", "10")).unwrap();
        assert_eq!(outcome, UpsertOutcome::Created { id: 3 });
    }

    #[test]
    fn test_snapshot_rejects_duplicate_keys() {
        let store = InMemoryCatalogStore::new();
        store.upsert(draft("A", "AMS", "1x1TBSATA", "10")).unwrap();
        let mut snapshot = store.snapshot();
        let mut dup = snapshot.records[0].clone();
        dup.id = 7;
        snapshot.records.push(dup);
        assert!(InMemoryCatalogStore::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_concurrent_readers() {
        let store = InMemoryCatalogStore::new();
        for i in 0..50 {
            store.upsert(draft(&format!("M{}", i), "AMS", "1x1TBSATA", "10")).unwrap();
        }
        let q = NormalizedQuery::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let q = q.clone();
                std::thread::spawn(move || store.query(&q.filters, &q.sort, q.page, q.limit).total())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 50);
        }
    }
}
