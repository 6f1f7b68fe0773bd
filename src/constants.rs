/// Canonical format for ledger dates (capture dates, sold dates).
/// Dates are stored as ISO text so lexicographic MAX equals chronological MAX.
pub const LEDGER_DATE_FMT: &str = "%Y-%m-%d";

/// Rolling trend window in days.
pub const DEFAULT_TREND_LOOKBACK_DAYS: i64 = 180;

/// Minimum sold samples before a suburb window is trusted.
pub const MIN_TREND_SAMPLES: usize = 5;

/// Fallback price per square metre when neither the suburb nor the
/// cross-suburb window has enough samples.
pub const DEFAULT_AVG_PRICE_PER_M2: f64 = 10_000.0;

/// Floor below which a bare number in a price string is not treated as a price.
pub const MIN_PLAUSIBLE_PRICE: i64 = 10_000;
