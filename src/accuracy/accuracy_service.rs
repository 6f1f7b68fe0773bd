use std::sync::Arc;

use super::accuracy_model::{
    AccuracyComparison, AccuracyReport, ComparisonSource, SoldRow, SourceAccuracy,
};
use super::accuracy_traits::{AccuracyRepositoryTrait, AccuracyServiceTrait};
use crate::errors::Result;
use crate::utils::date_utils::from_ledger_date;

type ErrorSelector = fn(&AccuracyComparison) -> Option<f64>;

/// The comparison sources with their error selectors, in tie-break order.
/// Winner selection and aggregation both walk this list so the three
/// sources stay symmetric.
const COMPARISON_SOURCES: [(ComparisonSource, ErrorSelector); 3] = [
    (ComparisonSource::Listed, |c| c.listed_error_pct),
    (ComparisonSource::Model, |c| c.model_error_pct),
    (ComparisonSource::PortalEstimate, |c| c.portal_error_pct),
];

pub struct AccuracyService<R: AccuracyRepositoryTrait> {
    repo: Arc<R>,
}

impl<R: AccuracyRepositoryTrait> AccuracyService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        AccuracyService { repo }
    }

    fn pick_winner(comparison: &AccuracyComparison) -> Option<ComparisonSource> {
        let mut winner: Option<(ComparisonSource, f64)> = None;
        for (source, selector) in COMPARISON_SOURCES {
            if let Some(error) = selector(comparison) {
                let abs = error.abs();
                // Strict less-than keeps the first-checked source on ties.
                if winner.map_or(true, |(_, best)| abs < best) {
                    winner = Some((source, abs));
                }
            }
        }
        winner.map(|(source, _)| source)
    }

    fn aggregate(comparisons: &[AccuracyComparison], selector: ErrorSelector) -> SourceAccuracy {
        let mut abs_errors: Vec<f64> = comparisons
            .iter()
            .filter_map(selector)
            .map(f64::abs)
            .collect();
        if abs_errors.is_empty() {
            return SourceAccuracy::default();
        }
        abs_errors.sort_by(|a, b| a.total_cmp(b));

        let mape = round1(abs_errors.iter().sum::<f64>() / abs_errors.len() as f64);
        // Floor-index median, no interpolation for even counts.
        let median_error = abs_errors[abs_errors.len() / 2];

        SourceAccuracy {
            count: abs_errors.len(),
            mape: Some(mape),
            median_error: Some(median_error),
        }
    }
}

impl<R: AccuracyRepositoryTrait> AccuracyServiceTrait for AccuracyService<R> {
    /// Join every priced sale against the estimates that existed before it.
    /// Nothing dated at or after a sale may inform its comparison.
    fn accuracy_report(&self) -> Result<AccuracyReport> {
        let sold_rows = self.repo.sold_with_known_price()?;
        let total_sold = sold_rows.len();

        let mut comparisons = Vec::new();
        for row in sold_rows {
            if let Some(comparison) = self.compare_one(row)? {
                comparisons.push(comparison);
            }
        }

        let [listed, model, portal] =
            COMPARISON_SOURCES.map(|(_, selector)| Self::aggregate(&comparisons, selector));

        Ok(AccuracyReport {
            total_sold,
            with_comparisons: comparisons.len(),
            comparisons,
            listed,
            model,
            portal,
        })
    }
}

impl<R: AccuracyRepositoryTrait> AccuracyService<R> {
    fn compare_one(&self, row: SoldRow) -> Result<Option<AccuracyComparison>> {
        let record_date = from_ledger_date(&row.record_date).ok_or_else(|| {
            crate::errors::Error::Ledger(crate::listings::LedgerError::InvalidDate(
                row.record_date.clone(),
            ))
        })?;
        // The sale event date; source text may have been unparseable, in
        // which case the capture date stands in.
        let sale_date = row
            .sold_date_iso
            .as_deref()
            .and_then(from_ledger_date)
            .unwrap_or(record_date);

        let mut comparison = AccuracyComparison {
            property_id: row.property_id.clone(),
            address: row.address,
            suburb: row.suburb,
            sold_price: row.sold_price,
            sold_date: row.sold_date,
            sale_date,
            record_date,
            beds: row.beds,
            baths: row.baths,
            cars: row.cars,
            property_type: row.property_type,
            listed_price: None,
            listed_display: None,
            listed_error_pct: None,
            model_price: None,
            model_date: None,
            model_error_pct: None,
            portal_estimate: None,
            portal_date: None,
            portal_error_pct: None,
            winner: None,
        };

        if let Some(asking) = self.repo.last_asking_before(&row.property_id, record_date)? {
            comparison.listed_display = Some(asking.price_display);
            if asking.price_value > 0 {
                comparison.listed_price = Some(asking.price_value);
                comparison.listed_error_pct =
                    Some(signed_error_pct(asking.price_value, row.sold_price));
            }
        }

        if let Some(prediction) = self
            .repo
            .latest_prediction_before(&row.property_id, sale_date)?
        {
            comparison.model_price = Some(prediction.predicted_price);
            comparison.model_date = Some(prediction.produced_at.chars().take(10).collect());
            comparison.model_error_pct =
                Some(signed_error_pct(prediction.predicted_price, row.sold_price));
        }

        if let Some(estimate) = self
            .repo
            .latest_estimate_before(&row.property_id, sale_date)?
        {
            if let Some(mid) = estimate.estimate_mid {
                comparison.portal_estimate = Some(mid);
                comparison.portal_date = Some(estimate.produced_at.chars().take(10).collect());
                comparison.portal_error_pct = Some(signed_error_pct(mid, row.sold_price));
            }
        }

        // Only report sales with at least one source to compare against.
        if comparison.listed_price.is_none()
            && comparison.model_price.is_none()
            && comparison.portal_estimate.is_none()
        {
            return Ok(None);
        }

        comparison.winner = Self::pick_winner(&comparison);
        Ok(Some(comparison))
    }
}

/// Signed percentage error of an estimate against the achieved price.
fn signed_error_pct(estimate: i64, actual: i64) -> f64 {
    round1((estimate - actual) as f64 / actual as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_error_is_relative_to_actual() {
        assert_eq!(signed_error_pct(1_100_000, 1_000_000), 10.0);
        assert_eq!(signed_error_pct(900_000, 1_000_000), -10.0);
    }

    #[test]
    fn error_rounds_to_one_decimal() {
        assert_eq!(signed_error_pct(1_015_500, 1_000_000), 1.6);
    }
}
