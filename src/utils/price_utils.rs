use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::constants::MIN_PLAUSIBLE_PRICE;

lazy_static! {
    static ref MILLIONS_RE: Regex = Regex::new(r"\$?(\d+(?:\.\d+)?)\s*[mM]").unwrap();
    static ref THOUSANDS_RE: Regex = Regex::new(r"\$?(\d+(?:\.\d+)?)\s*[kK]").unwrap();
    static ref RANGE_RE: Regex = Regex::new(r"\$?([\d,]+)\s*[-–—]\s*\$?[\d,]+").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"\$?([\d,]+)").unwrap();
    static ref LAND_SIZE_RE: Regex = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();
}

/// Markers for display prices that carry no numeric value at all.
const NON_NUMERIC_MARKERS: [&str; 5] = ["auction", "contact", "expression", "eoi", "offers"];

/// Extract a numeric price from a display string.
///
/// Handles "$1,500,000", "$1.5M", "$500K", "1500000", and ranges
/// ("$1,500,000 - $1,700,000" yields the lower bound). Strings like
/// "Auction" or "Contact Agent" yield `None`, which the ledger stores
/// as the meaningful unknown value 0.
pub fn extract_price_value(price_str: &str) -> Option<i64> {
    let price_str = price_str.trim();
    if price_str.is_empty() {
        return None;
    }

    let lower = price_str.to_lowercase();
    if NON_NUMERIC_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }

    if let Some(caps) = MILLIONS_RE.captures(price_str) {
        if let Ok(value) = caps[1].parse::<f64>() {
            return Some((value * 1_000_000.0) as i64);
        }
    }

    if let Some(caps) = THOUSANDS_RE.captures(price_str) {
        if let Ok(value) = caps[1].parse::<f64>() {
            return Some((value * 1_000.0) as i64);
        }
    }

    // For ranges, the first number is the lower bound
    if let Some(caps) = RANGE_RE.captures(price_str) {
        if let Ok(value) = caps[1].replace(',', "").parse::<i64>() {
            return Some(value);
        }
    }

    if let Some(caps) = NUMERIC_RE.captures(price_str) {
        if let Ok(value) = caps[1].replace(',', "").parse::<i64>() {
            // Sanity check: ignore values that are clearly not prices
            if value >= MIN_PLAUSIBLE_PRICE {
                return Some(value);
            }
        }
    }

    debug!("Could not extract price from: {}", price_str);
    None
}

/// Parse a land size string like "450m²", "450.5 m2" or "450" to square metres.
pub fn parse_land_size(land_str: &str) -> Option<f64> {
    let land_str = land_str.trim();
    if land_str.is_empty() || land_str.eq_ignore_ascii_case("na") || land_str == "-" {
        return None;
    }

    let caps = LAND_SIZE_RE.captures(land_str)?;
    let value = caps[1].parse::<f64>().ok()?;
    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Derived price per square metre, rounded to two decimals.
/// `None` when either side is unknown; the trend window skips such rows.
pub fn price_per_m2(price_value: i64, land_size: Option<&str>) -> Option<f64> {
    if price_value <= 0 {
        return None;
    }
    let size = parse_land_size(land_size?)?;
    Some(((price_value as f64 / size) * 100.0).round() / 100.0)
}

/// Case-folded, whitespace-normalized form of a display price, used when
/// deciding whether two displays are "the same". "$1,500,000 " and
/// "$1,500,000" must compare equal.
pub fn normalize_display(display: &str) -> String {
    display
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_and_formatted_prices() {
        assert_eq!(extract_price_value("$1,500,000"), Some(1_500_000));
        assert_eq!(extract_price_value("1500000"), Some(1_500_000));
        assert_eq!(extract_price_value("Price Guide $985,000"), Some(985_000));
    }

    #[test]
    fn extracts_shorthand_prices() {
        assert_eq!(extract_price_value("$1.5M"), Some(1_500_000));
        assert_eq!(extract_price_value("$1.5m"), Some(1_500_000));
        assert_eq!(extract_price_value("$850K"), Some(850_000));
    }

    #[test]
    fn range_yields_lower_bound() {
        assert_eq!(
            extract_price_value("$1,500,000 - $1,700,000"),
            Some(1_500_000)
        );
    }

    #[test]
    fn non_numeric_displays_yield_none() {
        assert_eq!(extract_price_value("Auction"), None);
        assert_eq!(extract_price_value("Contact Agent"), None);
        assert_eq!(extract_price_value("Expressions of Interest"), None);
        assert_eq!(extract_price_value(""), None);
    }

    #[test]
    fn implausibly_small_numbers_are_ignored() {
        assert_eq!(extract_price_value("4 bedrooms"), None);
    }

    #[test]
    fn land_size_parsing() {
        assert_eq!(parse_land_size("450m²"), Some(450.0));
        assert_eq!(parse_land_size("450.5 m2"), Some(450.5));
        assert_eq!(parse_land_size("na"), None);
        assert_eq!(parse_land_size("-"), None);
        assert_eq!(parse_land_size("0m²"), None);
    }

    #[test]
    fn price_per_m2_requires_both_sides() {
        assert_eq!(price_per_m2(900_000, Some("450m²")), Some(2000.0));
        assert_eq!(price_per_m2(0, Some("450m²")), None);
        assert_eq!(price_per_m2(900_000, Some("na")), None);
        assert_eq!(price_per_m2(900_000, None), None);
    }

    #[test]
    fn display_normalization_folds_case_and_whitespace() {
        assert_eq!(
            normalize_display("  Contact   AGENT "),
            normalize_display("contact agent")
        );
        assert_ne!(
            normalize_display("$1,500,000"),
            normalize_display("$1,550,000")
        );
    }
}
