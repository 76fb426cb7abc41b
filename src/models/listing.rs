use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RowError;
use crate::models::catalog_record::{CatalogRecord, Currency, DiskType, NaturalKey};
use crate::parsing::{parse_disk_type, parse_price, parse_ram_gb, parse_storage_gb};

/// Maximum number of fractional digits accepted in a price.
pub const MAX_PRICE_SCALE: u32 = 2;

/// Raw listing fields as they appear in a spreadsheet row or seed entry.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct RawListing {
    pub model: String,
    pub ram: String,
    #[serde(alias = "storage")]
    pub hdd: String,
    pub location: String,
    pub price: String,
}

impl RawListing {
    /// A row with no model, storage or price carries nothing to import.
    pub fn is_blank(&self) -> bool {
        self.model.trim().is_empty() && self.hdd.trim().is_empty() && self.price.trim().is_empty()
    }
}

/// A parsed listing ready to be upserted. Carries no id.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingDraft {
    pub model: String,
    pub ram_raw: String,
    pub ram_size_gb: u32,
    pub storage_raw: String,
    pub storage_total_gb: u64,
    pub disk_type: DiskType,
    pub location: String,
    pub price_amount: Decimal,
    pub currency: Currency,
}

impl ListingDraft {
    /// Derive typed fields from raw text. The only failure is a price amount
    /// that is not a non-negative decimal with at most two fractional digits.
    pub fn parse(raw: &RawListing) -> Result<Self, RowError> {
        let model = raw.model.trim().to_string();
        let ram_raw = raw.ram.trim().to_string();
        let storage_raw = raw.hdd.trim().to_string();
        let location = raw.location.trim().to_string();

        let price = parse_price(&raw.price);
        let price_amount = decimal_amount(&price.amount)?;

        Ok(Self {
            ram_size_gb: parse_ram_gb(&ram_raw),
            storage_total_gb: parse_storage_gb(&storage_raw),
            disk_type: parse_disk_type(&storage_raw),
            model,
            ram_raw,
            storage_raw,
            location,
            price_amount,
            currency: price.currency,
        })
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.model, &self.location, &self.storage_raw)
    }

    /// True when applying this draft to `record` would change a stored field.
    pub fn differs_from(&self, record: &CatalogRecord) -> bool {
        self.model != record.model
            || self.ram_raw != record.ram_raw
            || self.ram_size_gb != record.ram_size_gb
            || self.storage_raw != record.storage_raw
            || self.storage_total_gb != record.storage_total_gb
            || self.disk_type != record.disk_type
            || self.location != record.location
            || self.price_amount != record.price_amount
            || self.price_amount.scale() != record.price_amount.scale()
            || self.currency != record.currency
    }
}

fn decimal_amount(amount: &str) -> Result<Decimal, RowError> {
    let trimmed = amount.trim_end_matches('.');
    let candidate = if trimmed.starts_with('.') {
        format!("0{}", trimmed)
    } else if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    };
    let value = Decimal::from_str(&candidate).map_err(|_| RowError::InvalidPrice(amount.to_string()))?;
    if value.is_sign_negative() || value.scale() > MAX_PRICE_SCALE {
        return Err(RowError::InvalidPrice(amount.to_string()));
    }
    Ok(value)
}
