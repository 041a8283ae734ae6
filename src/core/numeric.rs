//! Tolerant extraction of numbers from mixed string/number input.

use crate::domain::model::NumericInput;
use regex::Regex;
use std::sync::LazyLock;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid decimal pattern"));

/// Returns the first decimal number embedded in `input`, or `None`.
///
/// Commas are read as decimal separators, so `"3,5 kWh"` yields `3.5`.
pub fn parse_number(input: Option<&NumericInput>) -> Option<f64> {
    match input? {
        NumericInput::Number(n) => n.is_finite().then_some(*n),
        NumericInput::Text(text) => parse_number_str(text),
    }
}

pub fn parse_number_str(text: &str) -> Option<f64> {
    let normalized = text.replace(',', ".");
    DECIMAL
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NumericInput {
        NumericInput::Text(s.to_string())
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_number(Some(&NumericInput::Number(95.0))), Some(95.0));
        assert_eq!(parse_number(Some(&NumericInput::Number(f64::NAN))), None);
    }

    #[test]
    fn test_parse_with_unit_suffix() {
        assert_eq!(parse_number(Some(&text("3.5 kWh"))), Some(3.5));
        assert_eq!(parse_number(Some(&text("95%"))), Some(95.0));
        assert_eq!(parse_number(Some(&text("about 60 Ah"))), Some(60.0));
    }

    #[test]
    fn test_parse_comma_decimal() {
        assert_eq!(parse_number(Some(&text("3,5kWh"))), Some(3.5));
    }

    #[test]
    fn test_parse_unparsable() {
        assert_eq!(parse_number(None), None);
        assert_eq!(parse_number(Some(&text(""))), None);
        assert_eq!(parse_number(Some(&text("unknown"))), None);
    }

    #[test]
    fn test_parse_overflowing_digits() {
        assert_eq!(parse_number_str(&"9".repeat(400)), None);
        assert_eq!(parse_number(Some(&NumericInput::Number(f64::INFINITY))), None);
        assert_eq!(parse_number_str("-1e12"), Some(1.0));
    }
}
