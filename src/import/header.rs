use crate::error::ImportError;
use crate::models::RawListing;

/// Semantic columns an import source can provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Model,
    Ram,
    Storage,
    Location,
    Price,
}

impl Column {
    pub const REQUIRED: [Column; 4] = [Column::Model, Column::Ram, Column::Storage, Column::Price];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Model => "model",
            Column::Ram => "ram",
            Column::Storage => "storage",
            Column::Location => "location",
            Column::Price => "price",
        }
    }

    /// Header spellings accepted for this column, already normalised.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Column::Model => &["model", "server", "server model", "name"],
            Column::Ram => &["ram", "memory"],
            Column::Storage => &["hdd", "storage", "hard disk", "disk", "disks"],
            Column::Location => &["location", "datacenter", "data center", "dc"],
            Column::Price => &["price", "cost", "monthly price"],
        }
    }
}

/// Column positions resolved from a header row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub model: usize,
    pub ram: usize,
    pub storage: usize,
    pub price: usize,
    pub location: Option<usize>,
}

impl ColumnMap {
    /// Match header cells against the synonym table (case-insensitive).
    /// The first matching cell wins. Fails listing every required column
    /// that could not be found.
    pub fn resolve(header: &[String]) -> Result<Self, ImportError> {
        let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
        let find = |column: Column| {
            normalized
                .iter()
                .position(|h| column.synonyms().contains(&h.as_str()))
        };

        let missing: Vec<String> = Column::REQUIRED
            .iter()
            .filter(|c| find(**c).is_none())
            .map(|c| c.name().to_string())
            .collect();

        match (find(Column::Model), find(Column::Ram), find(Column::Storage), find(Column::Price)) {
            (Some(model), Some(ram), Some(storage), Some(price)) => Ok(Self {
                model,
                ram,
                storage,
                price,
                location: find(Column::Location),
            }),
            _ => Err(ImportError::UnresolvedColumns(missing)),
        }
    }

    /// Pull the raw listing fields out of a row. Missing cells read as empty.
    pub fn extract(&self, row: &[String]) -> RawListing {
        let cell = |i: usize| row.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        RawListing {
            model: cell(self.model),
            ram: cell(self.ram),
            hdd: cell(self.storage),
            location: self.location.map(&cell).unwrap_or_default(),
            price: cell(self.price),
        }
    }
}

/// Lowercase, strip a BOM, treat `_`/`-` as spaces and collapse whitespace.
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
