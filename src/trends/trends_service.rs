use chrono::{Duration, NaiveDate};
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

use super::trends_traits::{TrendRepositoryTrait, TrendServiceTrait};
use crate::constants::{DEFAULT_AVG_PRICE_PER_M2, DEFAULT_TREND_LOOKBACK_DAYS, MIN_TREND_SAMPLES};
use crate::errors::Result;

/// Suburb-level rolling average of sold price per square metre.
///
/// Bulk feature preparation asks for the same `(suburb, month)` once per
/// listing row, so results are cached per service instance; the cache is an
/// explicit owned object, not module state.
pub struct TrendService<R: TrendRepositoryTrait> {
    repo: Arc<R>,
    cache: DashMap<String, f64>,
}

impl<R: TrendRepositoryTrait> TrendService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        TrendService {
            repo,
            cache: DashMap::new(),
        }
    }

    fn cache_key(suburb: &str, as_of: NaiveDate) -> String {
        format!("{}_{}", suburb.to_uppercase(), as_of.format("%Y-%m"))
    }

    fn mean(samples: &[f64]) -> f64 {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

impl<R: TrendRepositoryTrait> TrendServiceTrait for TrendService<R> {
    fn rolling_avg_price_per_m2(&self, suburb: &str, as_of: NaiveDate) -> Result<f64> {
        self.rolling_avg_with_lookback(suburb, as_of, DEFAULT_TREND_LOOKBACK_DAYS)
    }

    /// Mean sold price/m² over `[as_of - lookback_days, as_of)`. Under
    /// `MIN_TREND_SAMPLES` suburb samples the same window widens to all
    /// suburbs; still under the minimum, the fixed default applies.
    fn rolling_avg_with_lookback(
        &self,
        suburb: &str,
        as_of: NaiveDate,
        lookback_days: i64,
    ) -> Result<f64> {
        let key = Self::cache_key(suburb, as_of);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(*cached);
        }

        let from = as_of - Duration::days(lookback_days);
        let suburb_samples = self.repo.suburb_samples(suburb, from, as_of)?;

        let avg = if suburb_samples.len() >= MIN_TREND_SAMPLES {
            Self::mean(&suburb_samples)
        } else {
            let all_samples = self.repo.all_suburb_samples(from, as_of)?;
            if all_samples.len() >= MIN_TREND_SAMPLES {
                debug!(
                    "Only {} sold samples for {} as of {}; widening to all suburbs",
                    suburb_samples.len(),
                    suburb,
                    as_of
                );
                Self::mean(&all_samples)
            } else {
                DEFAULT_AVG_PRICE_PER_M2
            }
        };

        self.cache.insert(key, avg);
        Ok(avg)
    }
}
