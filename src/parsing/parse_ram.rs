use once_cell::sync::Lazy;
use regex::Regex;

static RAM_GB: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)GB").expect("valid RAM pattern"));

/// Parse the RAM size in GB from text such as `16GBDDR3`.
///
/// Only the `GB` unit is recognised; anything else (including `TB`) yields 0.
pub fn parse_ram_gb(text: &str) -> u32 {
    RAM_GB
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ram_gb() {
        assert_eq!(parse_ram_gb("16GBDDR3"), 16);
        assert_eq!(parse_ram_gb("128gbDDR4"), 128);
        assert_eq!(parse_ram_gb(" 4GB "), 4);
    }

    #[test]
    fn test_parse_ram_gb_without_unit() {
        assert_eq!(parse_ram_gb(""), 0);
        assert_eq!(parse_ram_gb("sixteen"), 0);
        assert_eq!(parse_ram_gb("2TB"), 0);
        assert_eq!(parse_ram_gb("32 GB"), 0);
    }

    #[test]
    fn test_parse_ram_gb_takes_first_match() {
        assert_eq!(parse_ram_gb("2x8GB (16GB total)"), 8);
    }
}
