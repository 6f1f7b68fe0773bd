use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::listings_errors::LedgerError;
use crate::utils::date_utils::{from_ledger_date, parse_to_iso, to_ledger_date};
use crate::utils::price_utils::{extract_price_value, price_per_m2};

pub const STATUS_FOR_SALE: &str = "FOR_SALE";
pub const STATUS_SOLD: &str = "SOLD";

/// Listing status. SOLD is terminal: one row per property, immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    ForSale,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::ForSale => STATUS_FOR_SALE,
            ListingStatus::Sold => STATUS_SOLD,
        }
    }
}

impl TryFrom<&str> for ListingStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            STATUS_FOR_SALE => Ok(ListingStatus::ForSale),
            STATUS_SOLD => Ok(ListingStatus::Sold),
            other => Err(LedgerError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity entity: created on first observation, never deleted.
/// Only `in_catchment` mutates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub first_seen: NaiveDate,
    pub url: String,
    pub in_catchment: bool,
}

/// Database model for properties
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::properties)]
#[diesel(primary_key(property_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropertyDB {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub first_seen: String,
    pub url: String,
    pub in_catchment: bool,
}

impl TryFrom<PropertyDB> for Property {
    type Error = LedgerError;

    fn try_from(db: PropertyDB) -> Result<Self, Self::Error> {
        let first_seen = from_ledger_date(&db.first_seen)
            .ok_or_else(|| LedgerError::InvalidDate(db.first_seen.clone()))?;
        Ok(Property {
            property_id: db.property_id,
            address: db.address,
            suburb: db.suburb,
            first_seen,
            url: db.url,
            in_catchment: db.in_catchment,
        })
    }
}

/// One observed state of a property on one date, under one status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSnapshot {
    pub property_id: String,
    pub date: NaiveDate,
    pub status: ListingStatus,
    pub price_display: String,
    pub price_value: i64,
    pub beds: i32,
    pub baths: i32,
    pub cars: i32,
    pub land_size: Option<String>,
    pub property_type: Option<String>,
    pub agent: String,
    pub captured_at: String,
    pub sold_date: Option<String>,
    pub sold_date_iso: Option<NaiveDate>,
    pub price_per_m2: Option<f64>,
}

/// Database model for listing snapshots
#[derive(Queryable, Identifiable, Insertable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = crate::schema::listing_history)]
#[diesel(primary_key(property_id, date, status))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListingSnapshotDB {
    pub property_id: String,
    pub date: String,
    pub status: String,
    pub price_display: String,
    pub price_value: i64,
    pub beds: i32,
    pub baths: i32,
    pub cars: i32,
    pub land_size: Option<String>,
    pub property_type: Option<String>,
    pub agent: String,
    pub captured_at: String,
    pub sold_date: Option<String>,
    pub sold_date_iso: Option<String>,
    pub price_per_m2: Option<f64>,
}

impl TryFrom<ListingSnapshotDB> for ListingSnapshot {
    type Error = LedgerError;

    fn try_from(db: ListingSnapshotDB) -> Result<Self, Self::Error> {
        let date =
            from_ledger_date(&db.date).ok_or_else(|| LedgerError::InvalidDate(db.date.clone()))?;
        let status = ListingStatus::try_from(db.status.as_str())?;
        Ok(ListingSnapshot {
            property_id: db.property_id,
            date,
            status,
            price_display: db.price_display,
            price_value: db.price_value,
            beds: db.beds,
            baths: db.baths,
            cars: db.cars,
            land_size: db.land_size,
            property_type: db.property_type,
            agent: db.agent,
            captured_at: db.captured_at,
            sold_date: db.sold_date,
            sold_date_iso: db.sold_date_iso.as_deref().and_then(from_ledger_date),
            price_per_m2: db.price_per_m2,
        })
    }
}

/// One normalized record from an ingestion batch, as handed over by the
/// crawling collaborator. `price_value` may be omitted, in which case the
/// ledger derives it from the display string (unknown stays 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRecord {
    pub id: String,
    pub address: String,
    pub suburb: String,
    pub status: ListingStatus,
    pub price_display: String,
    pub price_value: Option<i64>,
    pub beds: i32,
    pub baths: i32,
    pub cars: i32,
    pub land_size: Option<String>,
    pub property_type: Option<String>,
    pub url: String,
    pub agent: String,
    pub captured_at: String,
    pub sold_date: Option<String>,
}

impl ListingSnapshotDB {
    /// Build the row to persist for one ingested record. All input
    /// degradation happens here: unparseable price becomes 0, an
    /// unparseable sold date leaves `sold_date_iso` NULL, and a missing
    /// land size leaves `price_per_m2` NULL.
    pub fn from_record(record: &IngestRecord, capture_date: NaiveDate) -> Self {
        let price_value = record
            .price_value
            .or_else(|| extract_price_value(&record.price_display))
            .unwrap_or(0);
        let sold_date_iso = record
            .sold_date
            .as_deref()
            .and_then(parse_to_iso);
        let price_per_m2 = price_per_m2(price_value, record.land_size.as_deref());

        ListingSnapshotDB {
            property_id: record.id.clone(),
            date: to_ledger_date(capture_date),
            status: record.status.as_str().to_string(),
            price_display: record.price_display.clone(),
            price_value,
            beds: record.beds,
            baths: record.baths,
            cars: record.cars,
            land_size: record.land_size.clone(),
            property_type: record.property_type.clone(),
            agent: record.agent.clone(),
            captured_at: record.captured_at.clone(),
            sold_date: record.sold_date.clone(),
            sold_date_iso,
            price_per_m2,
        }
    }
}

/// Outcome of a single snapshot upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A brand-new row was written.
    Inserted,
    /// An existing FOR_SALE row for the same day was overwritten.
    Replaced,
    /// The property already has its one SOLD row; the record was ignored.
    SkippedExistingSold,
}

/// Outcome of one upsert plus whether the property row was created by it.
#[derive(Debug, Clone, Copy)]
pub struct UpsertResult {
    pub outcome: UpsertOutcome,
    pub created_property: bool,
}

/// Tally for one ingestion batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub capture_date: NaiveDate,
    pub records: usize,
    pub created_properties: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub skipped_sold: usize,
}

/// Latest-snapshot view row: the freshest snapshot of a property under one
/// status, joined with identity, first observed price, and the newest
/// collaborator estimate/prediction.
#[derive(QueryableByName, Debug, Clone)]
pub struct ListingViewRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub property_id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub date: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub status: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub price_display: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub price_value: i64,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub beds: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub baths: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub cars: i32,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub land_size: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub property_type: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub agent: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub sold_date: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub sold_date_iso: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Double>)]
    pub price_per_m2: Option<f64>,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub address: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub suburb: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub url: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub first_seen: String,
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub in_catchment: bool,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub first_price_display: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    pub estimate_low: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    pub estimate_mid: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    pub estimate_high: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub estimate_produced_at: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    pub predicted_price: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    pub prediction_range_low: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::BigInt>)]
    pub prediction_range_high: Option<i64>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub prediction_produced_at: Option<String>,
}

/// Serializable listing view handed to the reporting layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub url: String,
    pub first_seen: NaiveDate,
    pub in_catchment: bool,
    pub date: NaiveDate,
    pub status: ListingStatus,
    pub price_display: String,
    pub price_value: i64,
    pub beds: i32,
    pub baths: i32,
    pub cars: i32,
    pub land_size: Option<String>,
    pub property_type: Option<String>,
    pub agent: String,
    pub sold_date: Option<String>,
    pub sold_date_iso: Option<NaiveDate>,
    pub price_per_m2: Option<f64>,
    pub first_price_display: Option<String>,
    pub estimate_low: Option<i64>,
    pub estimate_mid: Option<i64>,
    pub estimate_high: Option<i64>,
    pub estimate_produced_at: Option<String>,
    pub predicted_price: Option<i64>,
    pub prediction_range_low: Option<i64>,
    pub prediction_range_high: Option<i64>,
    pub prediction_produced_at: Option<String>,
}

impl TryFrom<ListingViewRow> for ListingView {
    type Error = LedgerError;

    fn try_from(row: ListingViewRow) -> Result<Self, Self::Error> {
        let date =
            from_ledger_date(&row.date).ok_or_else(|| LedgerError::InvalidDate(row.date.clone()))?;
        let first_seen = from_ledger_date(&row.first_seen)
            .ok_or_else(|| LedgerError::InvalidDate(row.first_seen.clone()))?;
        let status = ListingStatus::try_from(row.status.as_str())?;
        Ok(ListingView {
            property_id: row.property_id,
            address: row.address,
            suburb: row.suburb,
            url: row.url,
            first_seen,
            in_catchment: row.in_catchment,
            date,
            status,
            price_display: row.price_display,
            price_value: row.price_value,
            beds: row.beds,
            baths: row.baths,
            cars: row.cars,
            land_size: row.land_size,
            property_type: row.property_type,
            agent: row.agent,
            sold_date: row.sold_date,
            sold_date_iso: row.sold_date_iso.as_deref().and_then(from_ledger_date),
            price_per_m2: row.price_per_m2,
            first_price_display: row.first_price_display,
            estimate_low: row.estimate_low,
            estimate_mid: row.estimate_mid,
            estimate_high: row.estimate_high,
            estimate_produced_at: row.estimate_produced_at,
            predicted_price: row.predicted_price,
            prediction_range_low: row.prediction_range_low,
            prediction_range_high: row.prediction_range_high,
            prediction_produced_at: row.prediction_produced_at,
        })
    }
}

/// Per-suburb tracked-property count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbCount {
    pub suburb: String,
    pub tracked: i64,
}

/// Summary statistics over the whole ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_tracked: i64,
    pub current_for_sale: i64,
    pub avg_asking_price: i64,
    pub suburbs: Vec<SuburbCount>,
    pub catchment_tracked: i64,
    pub catchment_for_sale: i64,
    pub catchment_sold: i64,
}

/// One matched property in a catchment flag update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchmentProperty {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub price_display: Option<String>,
}

/// Result of applying a catchment membership set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchmentUpdate {
    pub ids_supplied: usize,
    pub matched: usize,
    pub for_sale: Vec<CatchmentProperty>,
    pub sold: Vec<CatchmentProperty>,
}
