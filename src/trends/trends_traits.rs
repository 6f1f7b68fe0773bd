use chrono::NaiveDate;

use crate::errors::Result;

pub trait TrendRepositoryTrait: Send + Sync {
    fn suburb_samples(&self, suburb: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<f64>>;
    fn all_suburb_samples(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<f64>>;
}

pub trait TrendServiceTrait: Send + Sync {
    fn rolling_avg_price_per_m2(&self, suburb: &str, as_of: NaiveDate) -> Result<f64>;
    fn rolling_avg_with_lookback(
        &self,
        suburb: &str,
        as_of: NaiveDate,
        lookback_days: i64,
    ) -> Result<f64>;
}
