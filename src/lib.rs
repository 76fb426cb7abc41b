pub mod cache;
pub mod config;
pub mod error;
pub mod filters;
pub mod import;
pub mod models;
pub mod parsing;
pub mod services;
pub mod store;

pub use error::{ImportError, RowError, StoreError};
pub use models::{CatalogRecord, Currency, DiskType, ListingDraft, NaturalKey, QueryResult, RawListing};
pub use services::CatalogService;
