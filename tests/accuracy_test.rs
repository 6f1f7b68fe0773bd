use std::sync::Arc;

use propwatch_core::accuracy::{
    AccuracyRepository, AccuracyService, AccuracyServiceTrait, ComparisonSource,
};
use propwatch_core::estimates::{
    EstimateRecord, EstimateRepository, EstimateRepositoryTrait, PredictionRecord,
    PredictionRepository, PredictionRepositoryTrait,
};
use propwatch_core::{LedgerRepository, LedgerService, LedgerServiceTrait};

mod common;
use common::{d, for_sale, setup_pool, sold};

fn estimate(property_id: &str, mid: i64, produced_at: &str) -> EstimateRecord {
    EstimateRecord {
        property_id: property_id.to_string(),
        estimate_low: Some(mid - 50_000),
        estimate_mid: Some(mid),
        estimate_high: Some(mid + 50_000),
        produced_at: produced_at.to_string(),
    }
}

fn prediction(property_id: &str, price: i64, produced_at: &str) -> PredictionRecord {
    PredictionRecord {
        property_id: property_id.to_string(),
        predicted_price: price,
        range_low: Some(price - 100_000),
        range_high: Some(price + 100_000),
        produced_at: produced_at.to_string(),
        model_version: Some("v3".to_string()),
    }
}

#[test]
fn estimates_produced_at_or_after_the_sale_never_appear() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let estimates = EstimateRepository::new(pool.clone());
    let predictions = PredictionRepository::new(pool.clone());
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    ledger
        .ingest_batch(&[for_sale("P1", "$1,000,000", Some(1_000_000))], d(2024, 5, 1))
        .unwrap();
    // Sold 2024-06-01, captured a day later.
    ledger
        .ingest_batch(
            &[sold("P1", "$1,050,000 (1 Jun 2024)", Some(1_050_000), "1 Jun 2024")],
            d(2024, 6, 2),
        )
        .unwrap();

    // One estimate before the sale, one after; the current row is the
    // post-sale one.
    estimates
        .save(&estimate("P1", 1_020_000, "2024-05-20T10:00:00"))
        .unwrap();
    estimates
        .save(&estimate("P1", 1_049_000, "2024-06-05T10:00:00"))
        .unwrap();

    // The model only ran after the sale.
    predictions
        .save(&prediction("P1", 1_051_000, "2024-06-05T11:00:00"))
        .unwrap();

    let report = accuracy.accuracy_report().unwrap();
    assert_eq!(report.total_sold, 1);
    assert_eq!(report.with_comparisons, 1);

    let comparison = &report.comparisons[0];
    assert_eq!(comparison.sale_date, d(2024, 6, 1));
    assert_eq!(comparison.portal_estimate, Some(1_020_000));
    assert_eq!(comparison.portal_date.as_deref(), Some("2024-05-20"));
    assert_eq!(comparison.model_price, None);
}

#[test]
fn listed_price_is_the_final_asking_price_before_the_sold_capture() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    ledger
        .ingest_batch(&[for_sale("P1", "$1,000,000", Some(1_000_000))], d(2024, 5, 1))
        .unwrap();
    ledger
        .ingest_batch(&[for_sale("P1", "$980,000", Some(980_000))], d(2024, 5, 20))
        .unwrap();
    ledger
        .ingest_batch(
            &[sold("P1", "$1,000,000 (1 Jun 2024)", Some(1_000_000), "1 Jun 2024")],
            d(2024, 6, 2),
        )
        .unwrap();

    let report = accuracy.accuracy_report().unwrap();
    let comparison = &report.comparisons[0];
    assert_eq!(comparison.listed_price, Some(980_000));
    // (980,000 - 1,000,000) / 1,000,000
    assert_eq!(comparison.listed_error_pct, Some(-2.0));
    assert_eq!(comparison.winner, Some(ComparisonSource::Listed));
}

#[test]
fn winner_ties_keep_the_first_checked_source() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let predictions = PredictionRepository::new(pool.clone());
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    ledger
        .ingest_batch(&[for_sale("P1", "$1,100,000", Some(1_100_000))], d(2024, 5, 1))
        .unwrap();
    ledger
        .ingest_batch(
            &[sold("P1", "$1,000,000 (1 Jun 2024)", Some(1_000_000), "1 Jun 2024")],
            d(2024, 6, 2),
        )
        .unwrap();

    // Model prediction with the same +10% error as the asking price.
    predictions
        .save(&prediction("P1", 1_100_000, "2024-05-15T09:00:00"))
        .unwrap();

    let report = accuracy.accuracy_report().unwrap();
    let comparison = &report.comparisons[0];
    assert_eq!(comparison.listed_error_pct, Some(10.0));
    assert_eq!(comparison.model_error_pct, Some(10.0));
    assert_eq!(comparison.winner, Some(ComparisonSource::Listed));
}

#[test]
fn better_portal_estimate_wins() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let estimates = EstimateRepository::new(pool.clone());
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    ledger
        .ingest_batch(&[for_sale("P1", "$1,100,000", Some(1_100_000))], d(2024, 5, 1))
        .unwrap();
    ledger
        .ingest_batch(
            &[sold("P1", "$1,000,000 (1 Jun 2024)", Some(1_000_000), "1 Jun 2024")],
            d(2024, 6, 2),
        )
        .unwrap();
    estimates
        .save(&estimate("P1", 1_010_000, "2024-05-15T09:00:00"))
        .unwrap();

    let report = accuracy.accuracy_report().unwrap();
    let comparison = &report.comparisons[0];
    assert_eq!(comparison.winner, Some(ComparisonSource::PortalEstimate));
}

#[test]
fn mape_and_floor_index_median_over_even_counts() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    // Four sales whose asking prices land +10%, -20%, +30%, +40% off.
    let cases: [(&str, i64, i64); 4] = [
        ("P1", 1_100_000, 1_000_000),
        ("P2", 800_000, 1_000_000),
        ("P3", 1_300_000, 1_000_000),
        ("P4", 1_400_000, 1_000_000),
    ];
    for (id, asking, sold_price) in cases {
        ledger
            .ingest_batch(
                &[for_sale(id, &format!("${}", asking), Some(asking))],
                d(2024, 5, 1),
            )
            .unwrap();
        ledger
            .ingest_batch(
                &[sold(id, "Sold (1 Jun 2024)", Some(sold_price), "1 Jun 2024")],
                d(2024, 6, 2),
            )
            .unwrap();
    }

    let report = accuracy.accuracy_report().unwrap();
    assert_eq!(report.listed.count, 4);
    assert_eq!(report.listed.mape, Some(25.0));
    // Sorted absolute errors are [10, 20, 30, 40]; the floor index picks 30.
    assert_eq!(report.listed.median_error, Some(30.0));
    assert_eq!(report.model.count, 0);
    assert_eq!(report.model.mape, None);
}

#[test]
fn sales_with_no_sources_are_counted_but_not_compared() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    // Sold with no prior FOR_SALE row and no estimates at all.
    ledger
        .ingest_batch(
            &[sold("P1", "$950,000 (1 Jun 2024)", Some(950_000), "1 Jun 2024")],
            d(2024, 6, 2),
        )
        .unwrap();

    let report = accuracy.accuracy_report().unwrap();
    assert_eq!(report.total_sold, 1);
    assert_eq!(report.with_comparisons, 0);
    assert!(report.comparisons.is_empty());
}

#[test]
fn sold_rows_with_unknown_price_are_excluded() {
    let (_dir, pool) = setup_pool();
    let ledger = LedgerService::new(Arc::new(LedgerRepository::new(pool.clone())));
    let accuracy = AccuracyService::new(Arc::new(AccuracyRepository::new(pool)));

    ledger
        .ingest_batch(&[for_sale("P1", "$1,000,000", Some(1_000_000))], d(2024, 5, 1))
        .unwrap();
    ledger
        .ingest_batch(
            &[sold("P1", "Price Withheld", None, "1 Jun 2024")],
            d(2024, 6, 2),
        )
        .unwrap();

    let report = accuracy.accuracy_report().unwrap();
    assert_eq!(report.total_sold, 0);
    assert!(report.comparisons.is_empty());
}
