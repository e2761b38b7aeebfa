// src/config/duration.rs

use std::time::Duration;

/// Seconds per unit, for the units that scale whole seconds.
const SECOND_UNITS: &[(&str, u64)] = &[("s", 1), ("m", 60), ("h", 60 * 60)];

/// Parse a duration like `"250ms"`, `"10s"`, `"2m"` or `"1h"`.
///
/// Values that do not fit in a `Duration` are rejected rather than wrapped.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' missing unit suffix"))?;
    let (digits, unit) = s.split_at(split);
    let unit = unit.trim().to_ascii_lowercase();

    let count: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration number '{digits}': {e}"))?;

    if unit == "ms" {
        return Ok(Duration::from_millis(count));
    }

    let (_, scale) = SECOND_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .ok_or_else(|| format!("unsupported duration unit '{unit}'; expected ms, s, m, or h"))?;

    count
        .checked_mul(*scale)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 10s "), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_missing_or_unknown_units() {
        assert!(parse_duration("10").unwrap_err().contains("missing unit"));
        assert!(parse_duration("3d").unwrap_err().contains("unsupported"));
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn rejects_values_that_overflow() {
        assert!(
            parse_duration("307445734561825861m")
                .unwrap_err()
                .contains("too large")
        );
        assert!(parse_duration("18446744073709551615h").is_err());
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }
}
