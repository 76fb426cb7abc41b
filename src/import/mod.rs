pub mod header;
pub mod pipeline;
pub mod seed;
pub mod source;

pub use header::{Column, ColumnMap};
pub use pipeline::{import_file, import_source, ImportOptions, ImportPipeline, ImportProgress, ImportSummary};
pub use seed::{load_seed_file, parse_seed, seed_catalog};
pub use source::{open_source, CsvSource, RowSource, SourceFormat, SourceRow, SpreadsheetSource};
