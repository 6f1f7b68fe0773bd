#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;

use propwatch_core::db::{self, DbPool};
use propwatch_core::{IngestRecord, ListingStatus};

/// Creates a throwaway database with the full schema applied. The TempDir
/// must stay alive for the duration of the test.
pub fn setup_pool() -> (tempfile::TempDir, Arc<DbPool>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db::init(dir.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (dir, pool)
}

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A FOR_SALE ingestion record with sensible defaults.
pub fn for_sale(id: &str, display: &str, value: Option<i64>) -> IngestRecord {
    IngestRecord {
        id: id.to_string(),
        address: format!("{} Test St Baulkham Hills", id),
        suburb: "BAULKHAM HILLS".to_string(),
        status: ListingStatus::ForSale,
        price_display: display.to_string(),
        price_value: value,
        beds: 3,
        baths: 2,
        cars: 1,
        land_size: Some("500m²".to_string()),
        property_type: Some("house".to_string()),
        url: format!("https://example.com/property-{}", id),
        agent: "Test Agency".to_string(),
        captured_at: "2024-01-01T09:00:00".to_string(),
        sold_date: None,
    }
}

/// A SOLD ingestion record; `sold_date` is portal source text.
pub fn sold(id: &str, display: &str, value: Option<i64>, sold_date: &str) -> IngestRecord {
    IngestRecord {
        status: ListingStatus::Sold,
        sold_date: Some(sold_date.to_string()),
        ..for_sale(id, display, value)
    }
}

pub fn in_suburb(record: IngestRecord, suburb: &str) -> IngestRecord {
    IngestRecord {
        suburb: suburb.to_string(),
        ..record
    }
}
