//! @ai:module:intent Numeric extraction from free-text model replies
//! @ai:module:layer domain
//! @ai:module:public_api extract_value
//! @ai:module:stateless true

use crate::values::KpiValue;
use regex::Regex;
use std::sync::OnceLock;

/// Values above this are assumed to be in dollars and scaled to thousands.
const DOLLARS_THRESHOLD: f64 = 1000.0;

fn non_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9.]").unwrap())
}

/// @ai:intent Reduce a free-text reply to a single KPI value
/// Strips everything but digits and decimal points, defaults to 0 when
/// nothing parseable remains, and coerces dollar-magnitude values to
/// thousands.
/// @ai:effects pure
pub fn extract_value(content: &str) -> KpiValue {
    let numeric_str = non_numeric().replace_all(content.trim(), "");

    if numeric_str.is_empty() {
        tracing::warn!("No numeric data in '{}'. Defaulting to 0.", content);
        return KpiValue::zero();
    }

    match numeric_str.parse::<f64>() {
        Ok(mut value) => {
            if value > DOLLARS_THRESHOLD {
                value /= 1000.0;
                tracing::warn!(
                    "Value {} seems to be in dollars, converting to thousands: {}",
                    numeric_str,
                    value
                );
            }
            KpiValue::from_f64(value)
        }
        Err(_) => {
            tracing::warn!("Could not parse '{}' as a number. Defaulting to 0.", content);
            KpiValue::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_non_numeric_content_is_zero() {
        assert_eq!(extract_value("N/A"), KpiValue::zero());
        assert_eq!(extract_value("unknown"), KpiValue::zero());
        assert_eq!(extract_value(""), KpiValue::zero());
        assert_eq!(extract_value("   "), KpiValue::zero());
    }

    #[test]
    fn test_plain_integer_passes_through() {
        assert_eq!(extract_value("310"), KpiValue::Int(310));
        assert_eq!(extract_value("1000"), KpiValue::Int(1000));
    }

    #[test]
    fn test_decimal_with_units() {
        assert_eq!(extract_value("14.5 mpg"), KpiValue::Float(14.5));
        assert_eq!(extract_value("The range is 5.8 seconds"), KpiValue::Float(5.8));
    }

    #[test]
    fn test_dollars_converted_to_thousands() {
        assert_eq!(extract_value("25000"), KpiValue::Int(25));
        assert_eq!(extract_value("$41,500"), KpiValue::Float(41.5));
    }

    #[test]
    fn test_threshold_boundary() {
        // 1000 exactly is not treated as dollars.
        assert_eq!(extract_value("1000"), KpiValue::Int(1000));
        assert_eq!(extract_value("1001"), KpiValue::Float(1.001));
    }

    #[test]
    fn test_multiple_decimal_points_is_zero() {
        // "v1.2.3" strips to "1.2.3", which fails to parse as f64.
        assert_eq!(extract_value("v1.2.3"), KpiValue::zero());
    }

    #[test]
    fn test_whole_float_collapses_to_int() {
        assert_eq!(extract_value("203.0"), KpiValue::Int(203));
    }
}
