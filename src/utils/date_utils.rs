use chrono::NaiveDate;
use log::debug;

use crate::constants::LEDGER_DATE_FMT;

/// Formats tried against source date text, most common first.
/// "15 Jan 2024" is the portal's sold-date format; "15/01/2024" shows up in
/// older records.
const SOURCE_DATE_FORMATS: [&str; 4] = ["%d %b %Y", "%d %B %Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a source date string into a `NaiveDate`.
///
/// Accepts ISO dates ("2024-01-15"), ISO timestamps ("2024-01-15T10:30:00"),
/// and the portal formats above. Month-only text like "Jan 2024" resolves to
/// the first of the month. Returns `None` when nothing matches; callers treat
/// that as a missing derived feature, never an error.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    // ISO, with or without a time component
    let head = date_str.split('T').next().unwrap_or(date_str);
    if let Ok(date) = NaiveDate::parse_from_str(head, LEDGER_DATE_FMT) {
        return Some(date);
    }

    for fmt in SOURCE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, fmt) {
            return Some(date);
        }
    }

    // Month-year only ("Jan 2024")
    if let Ok(date) = NaiveDate::parse_from_str(&format!("01 {}", date_str), "%d %b %Y") {
        return Some(date);
    }

    debug!("Could not parse date: {}", date_str);
    None
}

/// Parse a source date string to canonical ISO form.
pub fn parse_to_iso(date_str: &str) -> Option<String> {
    parse_date(date_str).map(|d| d.format(LEDGER_DATE_FMT).to_string())
}

/// Format a date the way the ledger stores it.
pub fn to_ledger_date(date: NaiveDate) -> String {
    date.format(LEDGER_DATE_FMT).to_string()
}

/// Parse a ledger-stored ISO date back to a `NaiveDate`.
pub fn from_ledger_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, LEDGER_DATE_FMT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_timestamps() {
        assert_eq!(
            parse_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn parses_portal_formats() {
        assert_eq!(
            parse_date("15 Jan 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("15 January 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("15/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn month_year_resolves_to_first_of_month() {
        assert_eq!(parse_date("Jan 2024"), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn unparseable_dates_yield_none() {
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn iso_round_trip() {
        assert_eq!(parse_to_iso("15 Jan 2024").as_deref(), Some("2024-01-15"));
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(from_ledger_date(&to_ledger_date(d)), Some(d));
    }
}
