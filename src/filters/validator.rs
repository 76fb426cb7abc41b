//! Normalisation of untrusted filter, sort and pagination input.
//!
//! Invalid values never produce an error: filter values outside their
//! vocabulary are dropped and sort/pagination values fall back to defaults.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::raw_query::RawQuery;
use super::vocab::{
    SortField, SortOrder, StorageRange, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, RAM_OPTIONS_GB,
};
use crate::models::DiskType;

/// Well-formed filters. Every present value is guaranteed valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Selected buckets in canonical order, without duplicates. Combined with OR.
    pub storage_ranges: Vec<StorageRange>,
    pub ram_sizes: BTreeSet<u32>,
    pub disk_type: Option<DiskType>,
    pub location: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.storage_ranges.is_empty()
            && self.ram_sizes.is_empty()
            && self.disk_type.is_none()
            && self.location.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// A fully normalised query; the basis of the cache key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub page: u32,
    pub limit: u32,
}

impl Default for NormalizedQuery {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            sort: SortSpec::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

pub fn validate(raw: &RawQuery) -> NormalizedQuery {
    NormalizedQuery {
        filters: FilterSet {
            storage_ranges: normalize_storage_ranges(&raw.storage),
            ram_sizes: normalize_ram_sizes(&raw.ram),
            disk_type: raw.disk_type.as_deref().and_then(DiskType::from_filter_token),
            location: raw.location.as_deref().and_then(normalize_location),
            price_min: raw.price_min.as_deref().and_then(normalize_price_bound),
            price_max: raw.price_max.as_deref().and_then(normalize_price_bound),
        },
        sort: SortSpec {
            field: raw
                .sort
                .as_deref()
                .and_then(SortField::from_token)
                .unwrap_or_default(),
            order: raw
                .order
                .as_deref()
                .and_then(SortOrder::from_token)
                .unwrap_or_default(),
        },
        page: normalize_page(raw.page.as_deref()),
        limit: normalize_limit(raw.limit.as_deref()),
    }
}

pub fn normalize_storage_ranges(values: &[String]) -> Vec<StorageRange> {
    let mut ranges: Vec<StorageRange> = values
        .iter()
        .filter_map(|v| StorageRange::from_label(v))
        .collect();
    ranges.sort_by_key(StorageRange::ordinal);
    ranges.dedup();
    ranges
}

/// Accepts `16GB`, `16gb`, `16 GB` or `16`; keeps only whitelisted sizes.
pub fn normalize_ram_sizes(values: &[String]) -> BTreeSet<u32> {
    values
        .iter()
        .filter_map(|v| {
            let lower = v.trim().to_ascii_lowercase();
            let digits = lower.strip_suffix("gb").unwrap_or(&lower).trim_end();
            digits.parse::<u32>().ok()
        })
        .filter(|gb| RAM_OPTIONS_GB.contains(gb))
        .collect()
}

pub fn normalize_location(value: &str) -> Option<String> {
    let t = value.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// A bound is kept only if it is a non-negative number; otherwise it is omitted.
pub fn normalize_price_bound(value: &str) -> Option<Decimal> {
    let parsed = Decimal::from_str(value.trim()).ok()?;
    if parsed.is_sign_negative() && !parsed.is_zero() {
        None
    } else {
        Some(parsed.normalize())
    }
}

pub fn normalize_page(value: Option<&str>) -> u32 {
    value
        .and_then(coerce_int)
        .map(|p| p.clamp(1, u32::MAX as i64) as u32)
        .unwrap_or(DEFAULT_PAGE)
}

pub fn normalize_limit(value: Option<&str>) -> u32 {
    value
        .and_then(coerce_int)
        .map(|l| l.clamp(1, MAX_LIMIT as i64) as u32)
        .unwrap_or(DEFAULT_LIMIT)
}

/// Integer coercion: whole numbers as-is, finite decimals truncated, anything else rejected.
fn coerce_int(value: &str) -> Option<i64> {
    let t = value.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Some(i);
    }
    t.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}
