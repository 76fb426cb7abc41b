use serde::Serialize;

use crate::models::catalog_record::CatalogRecord;

/// Page metadata returned alongside a page of records.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: usize) -> Self {
        let limit_usize = limit.max(1) as usize;
        let total_pages = total.div_ceil(limit_usize);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: (page as usize) < total_pages,
            has_prev_page: page > 1,
        }
    }

    /// Offset of the first record on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

/// An ordered page of records plus the total match count. Immutable once built.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct QueryResult {
    pub data: Vec<CatalogRecord>,
    pub pagination: Pagination,
}

impl QueryResult {
    pub fn total(&self) -> usize {
        self.pagination.total
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
