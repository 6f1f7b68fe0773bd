use std::collections::HashSet;
use std::sync::Arc;

use propwatch_core::{
    LedgerRepository, LedgerRepositoryTrait, LedgerService, LedgerServiceTrait, ListingStatus,
    UpsertOutcome,
};

mod common;
use common::{d, for_sale, setup_pool, sold};

#[test]
fn reingesting_identical_for_sale_record_is_idempotent() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    let record = for_sale("P1", "$1,500,000", Some(1_500_000));
    let day = d(2024, 1, 1);

    let first = service.ingest_batch(&[record.clone()], day).unwrap();
    assert_eq!(first.created_properties, 1);
    assert_eq!(first.inserted, 1);
    assert_eq!(first.replaced, 0);

    let second = service.ingest_batch(&[record], day).unwrap();
    assert_eq!(second.created_properties, 0);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.replaced, 1);

    let history = service.property_history("P1").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price_value, 1_500_000);
}

#[test]
fn second_sold_ingestion_never_alters_the_stored_row() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    let original = sold("P1", "$1,400,000 (1 Jun 2024)", Some(1_400_000), "1 Jun 2024");
    service.ingest_batch(&[original], d(2024, 6, 2)).unwrap();

    // A later capture claims a different price; sold facts do not change.
    let conflicting = sold("P1", "$9,999,999 (1 Jun 2024)", Some(9_999_999), "1 Jun 2024");
    let summary = service.ingest_batch(&[conflicting], d(2024, 6, 9)).unwrap();
    assert_eq!(summary.skipped_sold, 1);
    assert_eq!(summary.inserted, 0);

    let history = service.property_history("P1").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].date, d(2024, 6, 2));
    assert_eq!(history[0].price_value, 1_400_000);
    assert_eq!(history[0].sold_date_iso, Some(d(2024, 6, 1)));
}

#[test]
fn first_seen_is_set_once_and_never_moves() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    service
        .ingest_batch(&[for_sale("P1", "$1,000,000", Some(1_000_000))], d(2024, 1, 1))
        .unwrap();
    service
        .ingest_batch(&[for_sale("P1", "$1,050,000", Some(1_050_000))], d(2024, 1, 8))
        .unwrap();

    let property = service.get_property("P1").unwrap().unwrap();
    assert_eq!(property.first_seen, d(2024, 1, 1));
}

#[test]
fn unknown_prices_are_normalized_to_zero_not_rejected() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    let record = for_sale("P1", "Contact Agent", None);
    let summary = service.ingest_batch(&[record], d(2024, 1, 1)).unwrap();
    assert_eq!(summary.inserted, 1);

    let history = service.property_history("P1").unwrap();
    assert_eq!(history[0].price_value, 0);
}

#[test]
fn price_value_is_derived_from_display_when_absent() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    service
        .ingest_batch(&[for_sale("P1", "$1.5M", None)], d(2024, 1, 1))
        .unwrap();

    let history = service.property_history("P1").unwrap();
    assert_eq!(history[0].price_value, 1_500_000);
    // 1,500,000 over 500m²
    assert_eq!(history[0].price_per_m2, Some(3_000.0));
}

#[test]
fn latest_views_keep_sold_and_for_sale_timelines_independent() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    service
        .ingest_batch(&[for_sale("P1", "$1,000,000", Some(1_000_000))], d(2024, 1, 1))
        .unwrap();
    service
        .ingest_batch(&[for_sale("P1", "$1,050,000", Some(1_050_000))], d(2024, 1, 8))
        .unwrap();
    service
        .ingest_batch(
            &[sold("P1", "$1,100,000 (14 Jan 2024)", Some(1_100_000), "14 Jan 2024")],
            d(2024, 1, 15),
        )
        .unwrap();

    let for_sale_views = service.latest_listings(ListingStatus::ForSale).unwrap();
    assert_eq!(for_sale_views.len(), 1);
    assert_eq!(for_sale_views[0].date, d(2024, 1, 8));
    assert_eq!(for_sale_views[0].price_value, 1_050_000);
    assert_eq!(
        for_sale_views[0].first_price_display.as_deref(),
        Some("$1,000,000")
    );

    let sold_views = service.latest_listings(ListingStatus::Sold).unwrap();
    assert_eq!(sold_views.len(), 1);
    assert_eq!(sold_views[0].date, d(2024, 1, 15));
    assert_eq!(sold_views[0].price_value, 1_100_000);
}

#[test]
fn direct_upsert_reports_outcomes() {
    let (_dir, pool) = setup_pool();
    let repo = LedgerRepository::new(pool);

    let record = for_sale("P1", "$800,000", Some(800_000));
    let day = d(2024, 3, 1);

    let first = repo.upsert_snapshot(&record, day).unwrap();
    assert!(first.created_property);
    assert_eq!(first.outcome, UpsertOutcome::Inserted);

    let again = repo.upsert_snapshot(&record, day).unwrap();
    assert!(!again.created_property);
    assert_eq!(again.outcome, UpsertOutcome::Replaced);

    let sold_record = sold("P1", "$810,000", Some(810_000), "5 Mar 2024");
    let first_sold = repo.upsert_snapshot(&sold_record, d(2024, 3, 6)).unwrap();
    assert_eq!(first_sold.outcome, UpsertOutcome::Inserted);
    let dup_sold = repo.upsert_snapshot(&sold_record, d(2024, 3, 7)).unwrap();
    assert_eq!(dup_sold.outcome, UpsertOutcome::SkippedExistingSold);
}

#[test]
fn catchment_flags_reset_then_set() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    service
        .ingest_batch(
            &[
                for_sale("P1", "$1,000,000", Some(1_000_000)),
                for_sale("P2", "$2,000,000", Some(2_000_000)),
            ],
            d(2024, 1, 1),
        )
        .unwrap();

    let first = service
        .update_catchment_flags(&HashSet::from(["P1".to_string()]))
        .unwrap();
    assert_eq!(first.matched, 1);
    assert_eq!(first.for_sale.len(), 1);
    assert_eq!(first.for_sale[0].property_id, "P1");

    // A later membership set replaces the old one entirely.
    let second = service
        .update_catchment_flags(&HashSet::from(["P2".to_string()]))
        .unwrap();
    assert_eq!(second.matched, 1);
    assert_eq!(second.for_sale[0].property_id, "P2");
    assert!(!service.get_property("P1").unwrap().unwrap().in_catchment);
    assert!(service.get_property("P2").unwrap().unwrap().in_catchment);
}

#[test]
fn market_stats_reflect_the_latest_capture() {
    let (_dir, pool) = setup_pool();
    let repo = Arc::new(LedgerRepository::new(pool));
    let service = LedgerService::new(repo.clone());

    service
        .ingest_batch(
            &[
                for_sale("P1", "$1,000,000", Some(1_000_000)),
                for_sale("P2", "Contact Agent", None),
            ],
            d(2024, 1, 1),
        )
        .unwrap();
    service
        .ingest_batch(&[for_sale("P1", "$1,200,000", Some(1_200_000))], d(2024, 1, 2))
        .unwrap();

    let stats = service.market_stats().unwrap();
    assert_eq!(stats.total_tracked, 2);
    // Only P1 has a row on the latest capture date.
    assert_eq!(stats.current_for_sale, 1);
    assert_eq!(stats.avg_asking_price, 1_200_000);
    assert_eq!(stats.suburbs.len(), 1);
    assert_eq!(stats.suburbs[0].tracked, 2);
}
