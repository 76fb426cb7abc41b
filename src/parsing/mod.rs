// Raw listing text parsers shared by the importer and the seed loader.
//
// Every function here is total: unparseable input yields a safe default
// (0, `DiskType::Unknown`, amount "0" in EUR) instead of an error.
pub mod parse_disk_type;
pub mod parse_price;
pub mod parse_ram;
pub mod parse_storage;

pub use parse_disk_type::parse_disk_type;
pub use parse_price::{parse_price, ParsedPrice};
pub use parse_ram::parse_ram_gb;
pub use parse_storage::{parse_storage_gb, GB_PER_TB};
