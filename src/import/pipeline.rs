use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use super::header::ColumnMap;
use super::source::{open_source, RowSource};
use crate::config::DEFAULT_IMPORT_BATCH_SIZE;
use crate::error::{ImportError, RowError};
use crate::models::{ListingDraft, NaturalKey, RawListing, UpsertOutcome};
use crate::services::CatalogService;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Rows parsed before pending writes are flushed. Zero is treated as one.
    pub batch_size: usize,
    /// Parse, match and count without writing anything.
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

/// Advisory progress report delivered after each flush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportProgress {
    pub processed: usize,
    pub total_estimate: Option<usize>,
    pub message: String,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// One entry per failed row: `Row <n>: <reason>`.
    pub errors: Vec<String>,
    pub rows_read: usize,
    pub batches: usize,
    pub dry_run: bool,
    pub duration_ms: u64,
}

impl ImportSummary {
    fn record_error(&mut self, row: usize, err: &RowError) {
        tracing::warn!(row, error = %err, "Skipping row");
        self.errors.push(format!("Row {}: {}", row, err));
        self.skipped += 1;
    }
}

/// Import a CSV or spreadsheet file into the catalog.
///
/// Fatal problems (extension, missing file, unreadable header) are returned
/// before anything is written. Row-level problems are collected in the summary.
pub fn import_file(
    catalog: &CatalogService,
    path: &Path,
    options: ImportOptions,
    progress: &mut dyn FnMut(&ImportProgress),
) -> Result<ImportSummary, ImportError> {
    let source = open_source(path)?;
    tracing::info!(path = %path.display(), dry_run = options.dry_run, batch_size = options.batch_size, "Starting import");
    import_source(catalog, source, options, progress)
}

/// Import from an already opened row source. The header is resolved first;
/// rows keep the line numbers the source reports, so messages match the file.
pub fn import_source(
    catalog: &CatalogService,
    source: Box<dyn RowSource>,
    options: ImportOptions,
    progress: &mut dyn FnMut(&ImportProgress),
) -> Result<ImportSummary, ImportError> {
    let columns = ColumnMap::resolve(source.header())?;
    let total = source.total_rows_estimate();
    let rows = source.map(move |row| (row.line, row.cells.map(|cells| columns.extract(&cells))));
    Ok(ImportPipeline::new(catalog, options).run(rows, total, progress))
}

/// The batched upsert loop shared by file imports and seed loading.
pub struct ImportPipeline<'a> {
    catalog: &'a CatalogService,
    batch_size: usize,
    dry_run: bool,
    pending: Vec<(usize, ListingDraft)>,
    /// Natural keys a dry run would have created, so repeats count as updates.
    /// Grows with the number of distinct new keys; real imports never touch it.
    dry_run_created: HashSet<NaturalKey>,
    summary: ImportSummary,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(catalog: &'a CatalogService, options: ImportOptions) -> Self {
        let batch_size = options.batch_size.max(1);
        Self {
            catalog,
            batch_size,
            dry_run: options.dry_run,
            pending: Vec::with_capacity(batch_size),
            dry_run_created: HashSet::new(),
            summary: ImportSummary {
                dry_run: options.dry_run,
                ..Default::default()
            },
        }
    }

    /// Consume `(row number, row)` pairs.
    pub fn run(
        mut self,
        rows: impl Iterator<Item = (usize, Result<RawListing, RowError>)>,
        total_estimate: Option<usize>,
        progress: &mut dyn FnMut(&ImportProgress),
    ) -> ImportSummary {
        let started = Instant::now();

        for (row_number, row) in rows {
            self.summary.rows_read += 1;

            let raw = match row {
                Ok(raw) => raw,
                Err(e) => {
                    self.summary.record_error(row_number, &e);
                    continue;
                }
            };
            if raw.is_blank() {
                self.summary.skipped += 1;
                continue;
            }
            match ListingDraft::parse(&raw) {
                Ok(draft) => self.pending.push((row_number, draft)),
                Err(e) => self.summary.record_error(row_number, &e),
            }

            if self.pending.len() >= self.batch_size {
                self.flush();
                self.report(total_estimate, progress);
            }
        }

        if !self.pending.is_empty() {
            self.flush();
            self.report(total_estimate, progress);
        }
        if !self.dry_run {
            self.catalog.invalidate_cache();
        }

        self.summary.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            created = self.summary.created,
            updated = self.summary.updated,
            skipped = self.summary.skipped,
            errors = self.summary.errors.len(),
            dry_run = self.dry_run,
            "Import finished"
        );
        self.summary
    }

    fn flush(&mut self) {
        let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.batch_size));
        self.summary.batches += 1;
        tracing::info!(batch = self.summary.batches, rows = batch.len(), dry_run = self.dry_run, "Flushing batch");

        if self.dry_run {
            for (_, draft) in batch {
                let key = draft.natural_key();
                if self.dry_run_created.contains(&key) || self.catalog.find_by_natural_key(&key).is_some() {
                    self.summary.updated += 1;
                } else {
                    self.summary.created += 1;
                    self.dry_run_created.insert(key);
                }
            }
            return;
        }

        let (rows, drafts): (Vec<usize>, Vec<ListingDraft>) = batch.into_iter().unzip();
        let outcomes = self.catalog.upsert_batch(drafts);
        for (row, outcome) in rows.into_iter().zip(outcomes) {
            match outcome {
                Ok(UpsertOutcome::Created { .. }) => self.summary.created += 1,
                Ok(UpsertOutcome::Updated { .. }) => self.summary.updated += 1,
                Err(e) => self.summary.record_error(row, &RowError::Store(e.to_string())),
            }
        }
    }

    fn report(&self, total_estimate: Option<usize>, progress: &mut dyn FnMut(&ImportProgress)) {
        let update = ImportProgress {
            processed: self.summary.rows_read,
            total_estimate,
            message: format!(
                "Batch {}: {} created, {} updated, {} skipped",
                self.summary.batches, self.summary.created, self.summary.updated, self.summary.skipped
            ),
        };
        // Progress is advisory; a failing observer must not take the import down.
        if catch_unwind(AssertUnwindSafe(|| progress(&update))).is_err() {
            tracing::warn!(processed = update.processed, "Progress observer panicked; continuing import");
        }
    }
}
