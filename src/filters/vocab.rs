//! Closed vocabularies accepted by the filter validator.

use serde::Serialize;

use crate::models::{DiskType, RamOption, StorageRangeOption};

/// A named storage bucket: `min_gb` inclusive, `max_gb` exclusive, open-ended when `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StorageRange {
    pub label: &'static str,
    pub min_gb: u64,
    pub max_gb: Option<u64>,
}

impl StorageRange {
    const fn new(label: &'static str, min_gb: u64, max_gb: Option<u64>) -> Self {
        Self { label, min_gb, max_gb }
    }

    pub fn contains(&self, gb: u64) -> bool {
        gb >= self.min_gb && self.max_gb.map_or(true, |max| gb < max)
    }

    pub fn from_label(label: &str) -> Option<StorageRange> {
        let t = label.trim();
        STORAGE_RANGES.iter().copied().find(|r| r.label.eq_ignore_ascii_case(t))
    }

    /// Position in the canonical bucket order.
    pub fn ordinal(&self) -> usize {
        STORAGE_RANGES
            .iter()
            .position(|r| r.label == self.label)
            .unwrap_or(usize::MAX)
    }
}

pub const STORAGE_RANGES: [StorageRange; 12] = [
    StorageRange::new("0-250GB", 0, Some(250)),
    StorageRange::new("250GB-500GB", 250, Some(500)),
    StorageRange::new("500GB-1TB", 500, Some(1_000)),
    StorageRange::new("1TB-2TB", 1_000, Some(2_000)),
    StorageRange::new("2TB-3TB", 2_000, Some(3_000)),
    StorageRange::new("3TB-4TB", 3_000, Some(4_000)),
    StorageRange::new("4TB-8TB", 4_000, Some(8_000)),
    StorageRange::new("8TB-12TB", 8_000, Some(12_000)),
    StorageRange::new("12TB-24TB", 12_000, Some(24_000)),
    StorageRange::new("24TB-48TB", 24_000, Some(48_000)),
    StorageRange::new("48TB-72TB", 48_000, Some(72_000)),
    StorageRange::new("72TB+", 72_000, None),
];

pub const RAM_OPTIONS_GB: [u32; 11] = [2, 4, 8, 12, 16, 24, 32, 48, 64, 96, 128];

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Price,
    Ram,
    Storage,
    Model,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Ram => "ram",
            SortField::Storage => "storage",
            SortField::Model => "model",
        }
    }

    pub fn from_token(token: &str) -> Option<SortField> {
        match token.trim().to_ascii_lowercase().as_str() {
            "price" => Some(SortField::Price),
            "ram" => Some(SortField::Ram),
            "storage" => Some(SortField::Storage),
            "model" => Some(SortField::Model),
            _ => None,
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn from_token(token: &str) -> Option<SortOrder> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

pub fn storage_range_options() -> Vec<StorageRangeOption> {
    STORAGE_RANGES
        .iter()
        .map(|r| StorageRangeOption {
            label: r.label.to_string(),
            min_gb: r.min_gb,
            max_gb: r.max_gb,
        })
        .collect()
}

pub fn ram_options() -> Vec<RamOption> {
    RAM_OPTIONS_GB
        .iter()
        .map(|gb| RamOption { label: format!("{}GB", gb), value: *gb })
        .collect()
}

pub fn disk_type_options() -> Vec<String> {
    DiskType::FILTERABLE.iter().map(|d| d.as_str().to_string()).collect()
}
