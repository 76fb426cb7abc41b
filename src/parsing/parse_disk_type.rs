use crate::models::DiskType;

/// Checked in this order; the first token contained in the text wins.
const DISK_TOKENS: [(&str, DiskType); 3] = [
    ("SSD", DiskType::Ssd),
    ("SAS", DiskType::Sas),
    ("SATA", DiskType::Sata),
];

/// Sniff the disk technology from storage text such as `2x2TBSATA2`.
pub fn parse_disk_type(text: &str) -> DiskType {
    let upper = text.to_ascii_uppercase();
    DISK_TOKENS
        .iter()
        .find(|(token, _)| upper.contains(token))
        .map(|(_, disk)| *disk)
        .unwrap_or(DiskType::Unknown)
}
