use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Disk technology sniffed from the raw storage text.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiskType {
    Sas,
    Sata,
    Ssd,
    Unknown,
}

impl DiskType {
    /// Disk types a caller may filter by. `Unknown` is never offered.
    pub const FILTERABLE: [DiskType; 3] = [DiskType::Sas, DiskType::Sata, DiskType::Ssd];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskType::Sas => "SAS",
            DiskType::Sata => "SATA",
            DiskType::Ssd => "SSD",
            DiskType::Unknown => "UNKNOWN",
        }
    }

    /// Resolve a filter token (case-insensitive). Only filterable types resolve.
    pub fn from_filter_token(token: &str) -> Option<DiskType> {
        let t = token.trim();
        Self::FILTERABLE
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(t))
    }
}

impl std::fmt::Display for DiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency tag of a listing price. Amounts are never converted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Sgd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Sgd => "SGD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Sgd => "S$",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (model, location, storage text) triple used to match imported rows
/// against existing records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey {
    pub model: String,
    pub location: String,
    pub storage_raw: String,
}

impl NaturalKey {
    pub fn new(model: impl Into<String>, location: impl Into<String>, storage_raw: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            location: location.into(),
            storage_raw: storage_raw.into(),
        }
    }
}

/// A persisted server listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Assigned on first persist, never reassigned.
    pub id: u64,
    pub model: String,
    pub ram_raw: String,
    pub ram_size_gb: u32,
    pub storage_raw: String,
    pub storage_total_gb: u64,
    pub disk_type: DiskType,
    pub location: String,
    pub price_amount: Decimal,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogRecord {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.model, &self.location, &self.storage_raw)
    }

    /// Human-readable price, e.g. `S$565.99`.
    pub fn display_price(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.price_amount)
    }
}
