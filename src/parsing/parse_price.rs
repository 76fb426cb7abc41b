use crate::models::Currency;

/// Result of a best-effort price parse. `amount` holds only digits and dots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPrice {
    pub amount: String,
    pub currency: Currency,
}

/// Parse a price such as `€49.99`, `$105.99` or `S$565.99`.
///
/// The currency comes from the prefix (`S$` before `$`, anything else is EUR).
/// The amount keeps every digit and decimal point of the input, defaulting
/// to `"0"` when none remain.
pub fn parse_price(text: &str) -> ParsedPrice {
    let trimmed = text.trim_start();
    let currency = if trimmed.starts_with("S$") || trimmed.starts_with("s$") {
        Currency::Sgd
    } else if trimmed.starts_with('$') {
        Currency::Usd
    } else {
        Currency::Eur
    };

    let mut amount: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if amount.is_empty() {
        amount.push('0');
    }

    ParsedPrice { amount, currency }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(amount: &str, currency: Currency) -> ParsedPrice {
        ParsedPrice { amount: amount.into(), currency }
    }

    #[test]
    fn test_parse_price_currencies() {
        assert_eq!(parse_price("S$565.99"), parsed("565.99", Currency::Sgd));
        assert_eq!(parse_price("$105.99"), parsed("105.99", Currency::Usd));
        assert_eq!(parse_price("€49.99"), parsed("49.99", Currency::Eur));
        assert_eq!(parse_price("49.99"), parsed("49.99", Currency::Eur));
    }

    #[test]
    fn test_parse_price_strips_noise() {
        assert_eq!(parse_price("$1,299.00 / month"), parsed("1299.00", Currency::Usd));
        assert_eq!(parse_price("  S$ 100"), parsed("100", Currency::Sgd));
    }

    #[test]
    fn test_parse_price_defaults_to_zero() {
        assert_eq!(parse_price(""), parsed("0", Currency::Eur));
        assert_eq!(parse_price("call us"), parsed("0", Currency::Eur));
        assert_eq!(parse_price("$"), parsed("0", Currency::Usd));
    }
}
