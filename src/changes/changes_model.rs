use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::listings::listings_errors::LedgerError;
use crate::listings::listings_model::ListingStatus;
use crate::utils::date_utils::{from_ledger_date, to_ledger_date};

/// Raw row for one snapshot joined with its property identity, as selected
/// by the classifier queries.
#[derive(QueryableByName, Debug, Clone)]
pub struct ChangeRow {
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
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub address: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub suburb: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub url: String,
}

/// Raw row for a property seen FOR_SALE on both comparison dates.
#[derive(QueryableByName, Debug, Clone)]
pub struct PairRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub property_id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub date: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub price_display: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub price_value: i64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub address: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub suburb: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub url: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub old_price_display: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub old_price_value: i64,
}

/// Raw row for the coarse adjustment bucket (per-property prior record).
#[derive(QueryableByName, Debug, Clone)]
pub struct AdjustmentRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub property_id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub date: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub address: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub suburb: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub price_display: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub status: String,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub beds: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub baths: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub cars: i32,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub land_size: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub old_price_display: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub old_status: String,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub old_beds: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub old_baths: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub old_cars: i32,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub old_land_size: Option<String>,
}

/// One listing in the typed change feed (NEW, SOLD_TRANSITION, DISAPPEARED).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingChange {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub url: String,
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
}

impl TryFrom<ChangeRow> for ListingChange {
    type Error = LedgerError;

    fn try_from(row: ChangeRow) -> Result<Self, Self::Error> {
        let date =
            from_ledger_date(&row.date).ok_or_else(|| LedgerError::InvalidDate(row.date.clone()))?;
        let status = ListingStatus::try_from(row.status.as_str())?;
        Ok(ListingChange {
            property_id: row.property_id,
            address: row.address,
            suburb: row.suburb,
            url: row.url,
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
        })
    }
}

/// A real asking-price movement (PRICE_CHANGE) or a revealed guide
/// (GUIDE_REVEALED). `diff` is populated only when both sides are known.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub url: String,
    pub date: NaiveDate,
    pub old_display: String,
    pub new_display: String,
    pub old_value: i64,
    pub new_value: i64,
    pub diff: Option<i64>,
}

/// One row of the coarse adjustment bucket: a property whose own most recent
/// prior record differs in any tracked attribute.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub date: NaiveDate,
    pub old_price_display: String,
    pub new_price_display: String,
    pub old_status: String,
    pub new_status: String,
    pub old_beds: i32,
    pub new_beds: i32,
    pub old_baths: i32,
    pub new_baths: i32,
    pub old_cars: i32,
    pub new_cars: i32,
    pub old_land_size: Option<String>,
    pub new_land_size: Option<String>,
}

impl TryFrom<AdjustmentRow> for Adjustment {
    type Error = LedgerError;

    fn try_from(row: AdjustmentRow) -> Result<Self, Self::Error> {
        let date =
            from_ledger_date(&row.date).ok_or_else(|| LedgerError::InvalidDate(row.date.clone()))?;
        Ok(Adjustment {
            property_id: row.property_id,
            address: row.address,
            suburb: row.suburb,
            date,
            old_price_display: row.old_price_display,
            new_price_display: row.price_display,
            old_status: row.old_status,
            new_status: row.status,
            old_beds: row.old_beds,
            new_beds: row.beds,
            old_baths: row.old_baths,
            new_baths: row.baths,
            old_cars: row.old_cars,
            new_cars: row.cars,
            old_land_size: row.old_land_size,
            new_land_size: row.land_size,
        })
    }
}

/// Typed day-over-day change feed for one target date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChanges {
    pub date: NaiveDate,
    pub prev_date: Option<NaiveDate>,
    pub new: Vec<ListingChange>,
    pub sold_transitions: Vec<ListingChange>,
    pub disappeared: Vec<ListingChange>,
    pub price_changes: Vec<PriceChange>,
    pub guide_revealed: Vec<PriceChange>,
}

impl DailyChanges {
    pub fn empty(date: NaiveDate, prev_date: Option<NaiveDate>) -> Self {
        DailyChanges {
            date,
            prev_date,
            new: Vec::new(),
            sold_transitions: Vec::new(),
            disappeared: Vec::new(),
            price_changes: Vec::new(),
            guide_revealed: Vec::new(),
        }
    }
}

/// Per-date tally of NEW / sold-or-withdrawn / coarse adjustments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub new_count: i32,
    pub sold_count: i32,
    pub adj_count: i32,
}

/// Database model for the daily summary table
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::daily_summary)]
#[diesel(primary_key(date))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailySummaryDB {
    pub date: String,
    pub new_count: i32,
    pub sold_count: i32,
    pub adj_count: i32,
}

impl TryFrom<DailySummaryDB> for DailySummary {
    type Error = LedgerError;

    fn try_from(db: DailySummaryDB) -> Result<Self, Self::Error> {
        let date =
            from_ledger_date(&db.date).ok_or_else(|| LedgerError::InvalidDate(db.date.clone()))?;
        Ok(DailySummary {
            date,
            new_count: db.new_count,
            sold_count: db.sold_count,
            adj_count: db.adj_count,
        })
    }
}

impl From<&DailySummary> for DailySummaryDB {
    fn from(s: &DailySummary) -> Self {
        DailySummaryDB {
            date: to_ledger_date(s.date),
            new_count: s.new_count,
            sold_count: s.sold_count,
            adj_count: s.adj_count,
        }
    }
}
