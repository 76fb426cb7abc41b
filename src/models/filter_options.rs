use serde::Serialize;

/// A storage bucket as offered to filter UIs.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageRangeOption {
    pub label: String,
    pub min_gb: u64,
    pub max_gb: Option<u64>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RamOption {
    pub label: String,
    pub value: u32,
}

/// Everything a filter UI needs to render its controls.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub storage_ranges: Vec<StorageRangeOption>,
    pub ram_options: Vec<RamOption>,
    pub disk_types: Vec<String>,
    pub locations: Vec<String>,
}
