//! Bandwidth strings from the chip dataset.
//!
//! Datasheet-derived fields arrive as text (`"600 GB/s"`, `"3.35 TB/s"`).
//! Anything that is not `<number> GB/s` or `<number> TB/s` is treated as
//! absent rather than an error: a row such as `"NVLink 4"` simply has no
//! usable figure.

const GB_PER_TB: f64 = 1000.0;

/// Parse a bandwidth string to GB/s.
pub fn parse_bandwidth_gbps(text: &str) -> Option<f64> {
    let (value, unit) = split_value_unit(text)?;
    if unit.eq_ignore_ascii_case("GB/s") {
        Some(value)
    } else if unit.eq_ignore_ascii_case("TB/s") {
        Some(value * GB_PER_TB)
    } else {
        None
    }
}

/// Parse a bandwidth string to TB/s.
pub fn parse_bandwidth_tbps(text: &str) -> Option<f64> {
    parse_bandwidth_gbps(text).map(|gbps| gbps / GB_PER_TB)
}

/// Split `"1,555.5 GB/s"` into `(1555.5, "GB/s")`.
fn split_value_unit(text: &str) -> Option<(f64, &str)> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    if number.is_empty() {
        return None;
    }

    let value: f64 = number.replace(',', "").parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value, unit.trim()))
}
