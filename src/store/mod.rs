//! Catalog storage: the store trait, shared query evaluation and the
//! in-memory backend with its JSON snapshot.

pub mod in_memory;
pub mod query;
pub mod snapshot;

pub use in_memory::InMemoryCatalogStore;
pub use snapshot::{load_snapshot, save_snapshot, CatalogSnapshot};

use crate::error::StoreError;
use crate::filters::{FilterSet, SortSpec};
use crate::models::{CatalogRecord, ListingDraft, NaturalKey, QueryResult, UpsertOutcome};

/// An ordered, queryable collection of catalog records.
///
/// Reads must be safe under arbitrary concurrent use. Writes come from a
/// single logical writer (the importer or the seed loader).
pub trait CatalogStore: Send + Sync {
    /// Filter, sort and paginate. Never fails; an out-of-range page is empty.
    fn query(&self, filters: &FilterSet, sort: &SortSpec, page: u32, limit: u32) -> QueryResult;

    /// Insert a new record or overwrite the one sharing the draft's natural key.
    fn upsert(&self, draft: ListingDraft) -> Result<UpsertOutcome, StoreError>;

    /// Upsert drafts in order, one outcome per draft.
    fn upsert_batch(&self, drafts: Vec<ListingDraft>) -> Vec<Result<UpsertOutcome, StoreError>> {
        drafts.into_iter().map(|d| self.upsert(d)).collect()
    }

    fn find_by_id(&self, id: u64) -> Option<CatalogRecord>;

    fn find_by_natural_key(&self, key: &NaturalKey) -> Option<CatalogRecord>;

    /// Distinct non-empty locations, alphabetically sorted.
    fn distinct_locations(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
