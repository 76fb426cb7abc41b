//! Seed loading: a JSON list of raw listings applied through the same
//! parse/upsert path as spreadsheet imports.

use std::path::Path;

use super::pipeline::{ImportOptions, ImportPipeline, ImportProgress, ImportSummary};
use crate::error::StoreError;
use crate::models::RawListing;
use crate::services::CatalogService;

/// Read seed entries. Accepts a bare array or an object with a `servers` array.
pub fn load_seed_file(path: &Path) -> Result<Vec<RawListing>, StoreError> {
    let text = std::fs::read_to_string(path)?;
    parse_seed(&text)
}

pub fn parse_seed(text: &str) -> Result<Vec<RawListing>, StoreError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let entries = match value {
        serde_json::Value::Object(mut obj) => obj
            .remove("servers")
            .ok_or_else(|| StoreError::Storage("seed object has no \"servers\" array".into()))?,
        other => other,
    };
    Ok(serde_json::from_value(entries)?)
}

pub fn seed_catalog(catalog: &CatalogService, entries: Vec<RawListing>, batch_size: usize) -> ImportSummary {
    let total = entries.len();
    tracing::info!(entries = total, "Seeding catalog");
    let options = ImportOptions { batch_size, dry_run: false };
    let rows = entries.into_iter().enumerate().map(|(i, entry)| (i + 1, Ok(entry)));
    ImportPipeline::new(catalog, options).run(rows, Some(total), &mut |_: &ImportProgress| {})
}
