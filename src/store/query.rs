//! Backend-independent query evaluation over a set of records.

use std::cmp::Ordering;

use crate::filters::{FilterSet, SortField, SortOrder, SortSpec};
use crate::models::{CatalogRecord, Pagination, QueryResult};

/// AND across dimensions; OR across the selected storage buckets.
pub fn matches(record: &CatalogRecord, filters: &FilterSet) -> bool {
    if !filters.storage_ranges.is_empty()
        && !filters
            .storage_ranges
            .iter()
            .any(|r| r.contains(record.storage_total_gb))
    {
        return false;
    }
    if !filters.ram_sizes.is_empty() && !filters.ram_sizes.contains(&record.ram_size_gb) {
        return false;
    }
    if let Some(disk) = filters.disk_type {
        if record.disk_type != disk {
            return false;
        }
    }
    if let Some(location) = &filters.location {
        if &record.location != location {
            return false;
        }
    }
    if let Some(min) = filters.price_min {
        if record.price_amount < min {
            return false;
        }
    }
    if let Some(max) = filters.price_max {
        if record.price_amount > max {
            return false;
        }
    }
    true
}

/// Single-key ordering with `id` ascending as the tie-break in both directions.
pub fn compare(a: &CatalogRecord, b: &CatalogRecord, sort: &SortSpec) -> Ordering {
    let primary = match sort.field {
        SortField::Price => a.price_amount.cmp(&b.price_amount),
        SortField::Ram => a.ram_size_gb.cmp(&b.ram_size_gb),
        SortField::Storage => a.storage_total_gb.cmp(&b.storage_total_gb),
        SortField::Model => a.model.cmp(&b.model),
    };
    let primary = match sort.order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

pub fn run_query<'a>(
    records: impl IntoIterator<Item = &'a CatalogRecord>,
    filters: &FilterSet,
    sort: &SortSpec,
    page: u32,
    limit: u32,
) -> QueryResult {
    let mut matched: Vec<&CatalogRecord> = records.into_iter().filter(|r| matches(r, filters)).collect();
    matched.sort_by(|a, b| compare(a, b, sort));

    let pagination = Pagination::new(page.max(1), limit.max(1), matched.len());
    let data = matched
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit as usize)
        .cloned()
        .collect();

    QueryResult { data, pagination }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{validate, RawQuery};
    use crate::models::{Currency, DiskType};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn record(id: u64, model: &str, ram: u32, storage: u64, price: i64) -> CatalogRecord {
        let now = Utc::now();
        CatalogRecord {
            id,
            model: model.into(),
            ram_raw: format!("{}GBDDR4", ram),
            ram_size_gb: ram,
            storage_raw: String::new(),
            storage_total_gb: storage,
            disk_type: DiskType::Sata,
            location: "AmsterdamAMS-01".into(),
            price_amount: Decimal::new(price, 2),
            currency: Currency::Eur,
            created_at: now,
            updated_at: now,
        }
    }

    fn fixture() -> Vec<CatalogRecord> {
        vec![
            record(1, "HP DL120", 16, 4000, 4999),
            record(2, "Dell R210", 8, 240, 3999),
            record(3, "Dell R730", 128, 16000, 22999),
            record(4, "Supermicro", 16, 1920, 4999),
        ]
    }

    fn query(pairs: &[(&str, &str)]) -> crate::filters::NormalizedQuery {
        validate(&RawQuery::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_storage_buckets_combine_with_or() {
        let records = fixture();
        let q = query(&[("storage", "0-250GB"), ("storage", "1TB-2TB")]);
        let result = run_query(&records, &q.filters, &q.sort, q.page, q.limit);
        let ids: Vec<u64> = result.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let records = fixture();
        let q = query(&[("ram", "16GB"), ("priceMax", "49.99"), ("priceMin", "49.99"), ("storage", "4TB-8TB")]);
        let result = run_query(&records, &q.filters, &q.sort, q.page, q.limit);
        let ids: Vec<u64> = result.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let records = fixture();
        let q = query(&[("sort", "ram"), ("order", "desc")]);
        let result = run_query(&records, &q.filters, &q.sort, q.page, q.limit);
        let ids: Vec<u64> = result.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_model_sort_is_lexicographic() {
        let records = fixture();
        let q = query(&[("sort", "model")]);
        let result = run_query(&records, &q.filters, &q.sort, q.page, q.limit);
        let models: Vec<&str> = result.data.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, vec!["Dell R210", "Dell R730", "HP DL120", "Supermicro"]);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let records = fixture();
        let q = query(&[("page", "5"), ("limit", "2")]);
        let result = run_query(&records, &q.filters, &q.sort, q.page, q.limit);
        assert!(result.is_empty());
        assert_eq!(result.total(), 4);
        assert_eq!(result.pagination.total_pages, 2);
    }
}
