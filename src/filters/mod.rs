pub mod query_string;
pub mod raw_query;
pub mod validator;
pub mod vocab;

pub use query_string::{build_query_string, query_signature};
pub use raw_query::RawQuery;
pub use validator::{validate, FilterSet, NormalizedQuery, SortSpec};
pub use vocab::{SortField, SortOrder, StorageRange, STORAGE_RANGES, RAM_OPTIONS_GB};
