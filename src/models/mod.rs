pub mod catalog_record;
pub mod filter_options;
pub mod listing;
pub mod query_result;
pub mod upsert_outcome;

pub use catalog_record::{CatalogRecord, Currency, DiskType, NaturalKey};
pub use filter_options::{FilterOptions, RamOption, StorageRangeOption};
pub use listing::{ListingDraft, RawListing, MAX_PRICE_SCALE};
pub use query_result::{Pagination, QueryResult};
pub use upsert_outcome::UpsertOutcome;
