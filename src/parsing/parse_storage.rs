use once_cell::sync::Lazy;
use regex::Regex;

/// Storage sizes are normalised to decimal GB.
pub const GB_PER_TB: u64 = 1000;

static STORAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)x(\d+)(GB|TB)").expect("valid storage pattern"));

/// Parse total storage in GB from text such as `2x2TBSATA2` or `4x480GBSSD`.
///
/// Returns `count * size`, with TB sizes multiplied by 1000. Returns 0 when
/// the `<count>x<size><unit>` pattern is absent.
pub fn parse_storage_gb(text: &str) -> u64 {
    let Some(caps) = STORAGE.captures(text) else {
        return 0;
    };
    let count = caps[1].parse::<u64>().unwrap_or(0);
    let size = caps[2].parse::<u64>().unwrap_or(0);
    let per_unit = if caps[3].eq_ignore_ascii_case("TB") { GB_PER_TB } else { 1 };
    count.saturating_mul(size).saturating_mul(per_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_gb_terabytes() {
        assert_eq!(parse_storage_gb("2x2TBSATA2"), 4000);
        assert_eq!(parse_storage_gb("8x2TBSATA2"), 16000);
        assert_eq!(parse_storage_gb("1x10tbsas"), 10000);
    }

    #[test]
    fn test_parse_storage_gb_gigabytes() {
        assert_eq!(parse_storage_gb("4x480GBSSD"), 1920);
        assert_eq!(parse_storage_gb("2x120GBSSD"), 240);
        assert_eq!(parse_storage_gb("2X500gbSATA2"), 1000);
    }

    #[test]
    fn test_parse_storage_gb_without_pattern() {
        assert_eq!(parse_storage_gb(""), 0);
        assert_eq!(parse_storage_gb("480GB SSD"), 0);
        assert_eq!(parse_storage_gb("2x SSD"), 0);
    }
}
