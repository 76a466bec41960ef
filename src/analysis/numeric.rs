use crate::data::model::FieldValue;

// ---------------------------------------------------------------------------
// Numeric classification of result cells
// ---------------------------------------------------------------------------

/// Whether a result cell counts as a usable numeric measurement.
pub fn is_numeric(value: Option<&FieldValue>) -> bool {
    numeric_value(value).is_some()
}

/// Parse a result cell into a measurement, or `None` when it is not one.
///
/// Rejected:
/// * null, absent, empty or whitespace-only cells
/// * pure letter tokens (`PASS`, `적합`): categorical results
/// * ranges (`99-101`, `100.0-102.2`): specification limits
/// * anything that does not parse as a finite `f64`
pub fn numeric_value(value: Option<&FieldValue>) -> Option<f64> {
    match value? {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Float(f) if f.is_finite() => Some(*f),
        other => other.as_text().and_then(parse_measurement),
    }
}

/// `s` is already trimmed.
fn parse_measurement(s: &str) -> Option<f64> {
    if s.is_empty() || is_letters_only(s) || is_range(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_letters_only(s: &str) -> bool {
    s.chars().all(char::is_alphabetic)
}

/// A range has a separating hyphen with text on both sides.
///
/// The separator is the first `-` after position 0 that is not an exponent
/// sign, so `-5` and `1e-5` are single values while `-5--3` is a range.
fn is_range(s: &str) -> bool {
    let bytes = s.as_bytes();
    let separator = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E'));
    match separator {
        Some(i) => !s[..i].trim().is_empty() && !s[i + 1..].trim().is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::String(s.to_string())
    }

    #[test]
    fn test_categorical_tokens_rejected() {
        assert!(!is_numeric(Some(&text("PASS"))));
        assert!(!is_numeric(Some(&text("Pass"))));
        assert!(!is_numeric(Some(&text("적합"))));
        assert!(!is_numeric(Some(&text(" NaN "))));
        assert!(!is_numeric(Some(&text("inf"))));
    }

    #[test]
    fn test_ranges_rejected() {
        assert!(!is_numeric(Some(&text("99-101"))));
        assert!(!is_numeric(Some(&text("100.0-102.2"))));
        assert!(!is_numeric(Some(&text("-5--3"))));
        assert!(!is_numeric(Some(&text("5-"))));
    }

    #[test]
    fn test_signed_and_exponent_values_accepted() {
        assert_eq!(numeric_value(Some(&text("-5"))), Some(-5.0));
        assert_eq!(numeric_value(Some(&text("1e-5"))), Some(1e-5));
        assert_eq!(numeric_value(Some(&text(" 100.25 "))), Some(100.25));
        assert_eq!(numeric_value(Some(&text("+3"))), Some(3.0));
    }

    #[test]
    fn test_empty_and_missing_rejected() {
        assert!(!is_numeric(None));
        assert!(!is_numeric(Some(&FieldValue::Null)));
        assert!(!is_numeric(Some(&text(""))));
        assert!(!is_numeric(Some(&text("   "))));
    }

    #[test]
    fn test_numeric_cells() {
        assert_eq!(numeric_value(Some(&FieldValue::Integer(7))), Some(7.0));
        assert_eq!(numeric_value(Some(&FieldValue::Float(7.5))), Some(7.5));
        assert!(!is_numeric(Some(&FieldValue::Float(f64::NAN))));
        assert!(!is_numeric(Some(&FieldValue::Bool(true))));
    }

    #[test]
    fn test_mixed_text_rejected() {
        assert!(!is_numeric(Some(&text("7.0 mg"))));
        assert!(!is_numeric(Some(&text("<0.1"))));
    }
}
