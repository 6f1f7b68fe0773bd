use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::collections::HashSet;
use std::sync::Arc;

use super::listings_model::{
    CatchmentProperty, CatchmentUpdate, IngestRecord, ListingSnapshot, ListingSnapshotDB,
    ListingStatus, ListingView, ListingViewRow, MarketStats, Property, PropertyDB, SuburbCount,
    UpsertOutcome, UpsertResult, STATUS_SOLD,
};
use super::listings_traits::LedgerRepositoryTrait;
use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::{listing_history, properties};
use crate::utils::date_utils::to_ledger_date;

pub struct LedgerRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        LedgerRepository { pool }
    }

    fn has_sold_row(conn: &mut SqliteConnection, id: &str) -> QueryResult<bool> {
        let count: i64 = listing_history::table
            .filter(listing_history::property_id.eq(id))
            .filter(listing_history::status.eq(STATUS_SOLD))
            .count()
            .get_result(conn)?;
        Ok(count > 0)
    }
}

impl LedgerRepositoryTrait for LedgerRepository {
    /// Persist one ingested record under the ledger's invariant rules.
    /// The property row and the snapshot row are written in a single
    /// immediate transaction; the call commits before returning.
    fn upsert_snapshot(
        &self,
        record: &IngestRecord,
        capture_date: chrono::NaiveDate,
    ) -> Result<UpsertResult> {
        let mut conn = get_connection(&self.pool)?;
        let row = ListingSnapshotDB::from_record(record, capture_date);

        let result = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            let existing_first_seen: Option<String> = properties::table
                .find(&record.id)
                .select(properties::first_seen)
                .first(conn)
                .optional()?;

            let created_property = existing_first_seen.is_none();
            if created_property {
                let property = PropertyDB {
                    property_id: record.id.clone(),
                    address: record.address.clone(),
                    suburb: record.suburb.clone(),
                    first_seen: to_ledger_date(capture_date),
                    url: record.url.clone(),
                    in_catchment: false,
                };
                diesel::insert_into(properties::table)
                    .values(&property)
                    .execute(conn)?;
            }

            let outcome = match record.status {
                // Sold facts do not change after the fact: the first SOLD row
                // for a property is also its last.
                ListingStatus::Sold => {
                    if Self::has_sold_row(conn, &record.id)? {
                        UpsertOutcome::SkippedExistingSold
                    } else {
                        diesel::insert_into(listing_history::table)
                            .values(&row)
                            .execute(conn)?;
                        UpsertOutcome::Inserted
                    }
                }
                ListingStatus::ForSale => {
                    let already_there: i64 = listing_history::table
                        .filter(listing_history::property_id.eq(&row.property_id))
                        .filter(listing_history::date.eq(&row.date))
                        .filter(listing_history::status.eq(&row.status))
                        .count()
                        .get_result(conn)?;
                    diesel::replace_into(listing_history::table)
                        .values(&row)
                        .execute(conn)?;
                    if already_there > 0 {
                        UpsertOutcome::Replaced
                    } else {
                        UpsertOutcome::Inserted
                    }
                }
            };

            Ok(UpsertResult {
                outcome,
                created_property,
            })
        })?;

        Ok(result)
    }

    fn get_property(&self, id: &str) -> Result<Option<Property>> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<PropertyDB> = properties::table
            .find(id)
            .select(PropertyDB::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(db) => Ok(Some(Property::try_from(db).map_err(crate::errors::Error::Ledger)?)),
            None => Ok(None),
        }
    }

    fn snapshot(
        &self,
        id: &str,
        date: chrono::NaiveDate,
        status: ListingStatus,
    ) -> Result<Option<ListingSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<ListingSnapshotDB> = listing_history::table
            .find((id, to_ledger_date(date), status.as_str()))
            .select(ListingSnapshotDB::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(db) => Ok(Some(
                ListingSnapshot::try_from(db).map_err(crate::errors::Error::Ledger)?,
            )),
            None => Ok(None),
        }
    }

    fn history_for_property(&self, id: &str) -> Result<Vec<ListingSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<ListingSnapshotDB> = listing_history::table
            .filter(listing_history::property_id.eq(id))
            .order(listing_history::date.asc())
            .select(ListingSnapshotDB::as_select())
            .load(&mut conn)?;
        rows.into_iter()
            .map(|db| ListingSnapshot::try_from(db).map_err(crate::errors::Error::Ledger))
            .collect()
    }

    /// The freshest snapshot per property *within one status timeline*.
    /// Sold and for-sale timelines are independent; the inner MAX(date) is
    /// per property and per status, never a global maximum.
    fn latest_views_by_status(&self, status: ListingStatus) -> Result<Vec<ListingView>> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<ListingViewRow> = diesel::sql_query(
            "SELECT h.property_id, h.date, h.status, h.price_display, h.price_value,
                    h.beds, h.baths, h.cars, h.land_size, h.property_type, h.agent,
                    h.sold_date, h.sold_date_iso, h.price_per_m2,
                    p.address, p.suburb, p.url, p.first_seen, p.in_catchment,
                    (SELECT price_display FROM listing_history
                     WHERE property_id = h.property_id
                     ORDER BY date ASC LIMIT 1) AS first_price_display,
                    e.estimate_low, e.estimate_mid, e.estimate_high,
                    e.produced_at AS estimate_produced_at,
                    x.predicted_price,
                    x.range_low AS prediction_range_low,
                    x.range_high AS prediction_range_high,
                    x.produced_at AS prediction_produced_at
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             LEFT JOIN estimates e ON h.property_id = e.property_id
             LEFT JOIN predictions x ON h.property_id = x.property_id
             WHERE h.status = ?
               AND h.date = (SELECT MAX(date) FROM listing_history
                             WHERE property_id = h.property_id AND status = ?)
             ORDER BY p.suburb, p.address",
        )
        .bind::<diesel::sql_types::Text, _>(status.as_str())
        .bind::<diesel::sql_types::Text, _>(status.as_str())
        .load(&mut conn)?;

        rows.into_iter()
            .map(|row| ListingView::try_from(row).map_err(crate::errors::Error::Ledger))
            .collect()
    }

    /// Apply a catchment membership set: reset every flag, set the supplied
    /// ids, and report what matched grouped by current status.
    fn update_catchment_flags(&self, ids: &HashSet<String>) -> Result<CatchmentUpdate> {
        let mut conn = get_connection(&self.pool)?;

        let matched = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::update(properties::table)
                .set(properties::in_catchment.eq(false))
                .execute(conn)?;
            diesel::update(
                properties::table.filter(properties::property_id.eq_any(ids.iter())),
            )
            .set(properties::in_catchment.eq(true))
            .execute(conn)
        })?;

        let rows: Vec<CatchmentRow> = diesel::sql_query(
            "SELECT p.property_id, p.address, p.suburb,
                    (SELECT lh.status FROM listing_history lh
                     WHERE lh.property_id = p.property_id
                     ORDER BY lh.date DESC LIMIT 1) AS current_status,
                    (SELECT lh.price_display FROM listing_history lh
                     WHERE lh.property_id = p.property_id
                     ORDER BY lh.date DESC LIMIT 1) AS current_price
             FROM properties p
             WHERE p.in_catchment = 1
             ORDER BY p.suburb, p.address",
        )
        .load(&mut conn)?;

        let mut update = CatchmentUpdate {
            ids_supplied: ids.len(),
            matched,
            for_sale: Vec::new(),
            sold: Vec::new(),
        };
        for row in rows {
            let entry = CatchmentProperty {
                property_id: row.property_id,
                address: row.address,
                suburb: row.suburb,
                price_display: row.current_price,
            };
            if row.current_status.as_deref() == Some(STATUS_SOLD) {
                update.sold.push(entry);
            } else {
                update.for_sale.push(entry);
            }
        }

        Ok(update)
    }

    fn market_stats(&self) -> Result<MarketStats> {
        let mut conn = get_connection(&self.pool)?;

        let total_tracked: i64 = properties::table.count().get_result(&mut conn)?;

        let latest_date: Option<String> = listing_history::table
            .select(diesel::dsl::max(listing_history::date))
            .first(&mut conn)?;

        let (current_for_sale, avg_asking_price) = match latest_date {
            Some(ref date) => {
                let current: i64 = listing_history::table
                    .filter(listing_history::status.eq(ListingStatus::ForSale.as_str()))
                    .filter(listing_history::date.eq(date))
                    .count()
                    .get_result(&mut conn)?;
                let priced: Vec<i64> = listing_history::table
                    .filter(listing_history::status.eq(ListingStatus::ForSale.as_str()))
                    .filter(listing_history::date.eq(date))
                    .filter(listing_history::price_value.gt(0))
                    .select(listing_history::price_value)
                    .load(&mut conn)?;
                let avg = if priced.is_empty() {
                    0
                } else {
                    priced.iter().sum::<i64>() / priced.len() as i64
                };
                (current, avg)
            }
            None => (0, 0),
        };

        let suburb_rows: Vec<(String, i64)> = properties::table
            .group_by(properties::suburb)
            .select((properties::suburb, diesel::dsl::count_star()))
            .order(properties::suburb.asc())
            .load(&mut conn)?;
        let suburbs = suburb_rows
            .into_iter()
            .map(|(suburb, tracked)| SuburbCount { suburb, tracked })
            .collect();

        let catchment_tracked: i64 = properties::table
            .filter(properties::in_catchment.eq(true))
            .count()
            .get_result(&mut conn)?;

        let catchment_for_sale = count_catchment_by_status(&mut conn, true)?;
        let catchment_sold = count_catchment_by_status(&mut conn, false)?;

        Ok(MarketStats {
            total_tracked,
            current_for_sale,
            avg_asking_price,
            suburbs,
            catchment_tracked,
            catchment_for_sale,
            catchment_sold,
        })
    }
}

#[derive(QueryableByName, Debug)]
struct CatchmentRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    property_id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    address: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    suburb: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    current_status: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    current_price: Option<String>,
}

#[derive(QueryableByName, Debug)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    n: i64,
}

fn count_catchment_by_status(conn: &mut SqliteConnection, for_sale: bool) -> Result<i64> {
    let query = if for_sale {
        // "Currently for sale" means a row on the most recent capture date.
        "SELECT COUNT(DISTINCT p.property_id) AS n
         FROM properties p
         JOIN listing_history h ON p.property_id = h.property_id
         WHERE p.in_catchment = 1 AND h.status = 'FOR_SALE'
           AND h.date = (SELECT MAX(date) FROM listing_history)"
    } else {
        "SELECT COUNT(DISTINCT p.property_id) AS n
         FROM properties p
         JOIN listing_history h ON p.property_id = h.property_id
         WHERE p.in_catchment = 1 AND h.status = 'SOLD'"
    };
    let row: CountRow = diesel::sql_query(query).get_result(conn)?;
    Ok(row.n)
}
