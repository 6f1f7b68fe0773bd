use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::changes_model::{AdjustmentRow, ChangeRow, DailySummary, DailySummaryDB, PairRow};
use super::changes_traits::ChangeRepositoryTrait;
use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::{daily_summary, listing_history};
use crate::utils::date_utils::{from_ledger_date, to_ledger_date};

const CHANGE_ROW_SELECT: &str =
    "h.property_id, h.date, h.status, h.price_display, h.price_value,
     h.beds, h.baths, h.cars, h.land_size, h.property_type, h.agent,
     h.sold_date, h.sold_date_iso,
     p.address, p.suburb, p.url";

pub struct ChangeRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl ChangeRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        ChangeRepository { pool }
    }
}

impl ChangeRepositoryTrait for ChangeRepository {
    /// The most recent capture date strictly before `target`. There is no
    /// guarantee of daily contiguity; whatever date comes back is the
    /// baseline for the typed feed.
    fn previous_capture_date(&self, target: NaiveDate) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let max_date: Option<String> = listing_history::table
            .filter(listing_history::date.lt(to_ledger_date(target)))
            .select(diesel::dsl::max(listing_history::date))
            .first(&mut conn)?;
        Ok(max_date.as_deref().and_then(from_ledger_date))
    }

    /// Snapshots on `target` whose property was first observed on `target`.
    fn new_listings_on(&self, target: NaiveDate) -> Result<Vec<ChangeRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(format!(
            "SELECT {CHANGE_ROW_SELECT}
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             WHERE h.date = ? AND p.first_seen = ?"
        ))
        .bind::<Text, _>(to_ledger_date(target))
        .bind::<Text, _>(to_ledger_date(target))
        .load(&mut conn)?)
    }

    /// Every FOR_SALE snapshot on `target`, used for the bootstrap day.
    fn for_sale_on(&self, target: NaiveDate) -> Result<Vec<ChangeRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(format!(
            "SELECT {CHANGE_ROW_SELECT}
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             WHERE h.date = ? AND h.status = 'FOR_SALE'"
        ))
        .bind::<Text, _>(to_ledger_date(target))
        .load(&mut conn)?)
    }

    /// SOLD snapshots on `target` whose property was FOR_SALE on `prev`.
    fn sold_transitions(&self, target: NaiveDate, prev: NaiveDate) -> Result<Vec<ChangeRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(format!(
            "SELECT {CHANGE_ROW_SELECT}
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             JOIN listing_history h_prev ON h.property_id = h_prev.property_id
             WHERE h.date = ? AND h.status = 'SOLD'
               AND h_prev.date = ? AND h_prev.status = 'FOR_SALE'"
        ))
        .bind::<Text, _>(to_ledger_date(target))
        .bind::<Text, _>(to_ledger_date(prev))
        .load(&mut conn)?)
    }

    /// FOR_SALE on `prev` with no snapshot of any status on `target`:
    /// withdrawn, relisted elsewhere, or simply unobserved.
    fn disappeared(&self, prev: NaiveDate, target: NaiveDate) -> Result<Vec<ChangeRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(format!(
            "SELECT {CHANGE_ROW_SELECT}
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             WHERE h.date = ? AND h.status = 'FOR_SALE'
               AND NOT EXISTS (
                   SELECT 1 FROM listing_history h_now
                   WHERE h_now.property_id = h.property_id AND h_now.date = ?
               )"
        ))
        .bind::<Text, _>(to_ledger_date(prev))
        .bind::<Text, _>(to_ledger_date(target))
        .load(&mut conn)?)
    }

    /// Properties FOR_SALE on both dates, paired with the prior display and
    /// value. Classification into PRICE_CHANGE / GUIDE_REVEALED happens in
    /// the service.
    fn for_sale_pairs(&self, target: NaiveDate, prev: NaiveDate) -> Result<Vec<PairRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(
            "SELECT h.property_id, h.date, h.price_display, h.price_value,
                    p.address, p.suburb, p.url,
                    h_prev.price_display AS old_price_display,
                    h_prev.price_value AS old_price_value
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             JOIN listing_history h_prev ON h.property_id = h_prev.property_id
             WHERE h.date = ? AND h.status = 'FOR_SALE'
               AND h_prev.date = ? AND h_prev.status = 'FOR_SALE'",
        )
        .bind::<Text, _>(to_ledger_date(target))
        .bind::<Text, _>(to_ledger_date(prev))
        .load(&mut conn)?)
    }

    /// Coarse bucket: any property on `target` whose own most recent prior
    /// record differs in any tracked attribute. The inner MAX(date) is per
    /// property; a single global previous date would misclassify properties
    /// with observation gaps.
    fn adjustments_on(&self, target: NaiveDate) -> Result<Vec<AdjustmentRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(
            "SELECT h.property_id, h.date,
                    p.address, p.suburb,
                    h.price_display, h.status, h.beds, h.baths, h.cars, h.land_size,
                    h_prev.price_display AS old_price_display,
                    h_prev.status AS old_status,
                    h_prev.beds AS old_beds,
                    h_prev.baths AS old_baths,
                    h_prev.cars AS old_cars,
                    h_prev.land_size AS old_land_size
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             JOIN listing_history h_prev ON h.property_id = h_prev.property_id
             WHERE h.date = ?
               AND h_prev.date = (SELECT MAX(date) FROM listing_history
                                  WHERE property_id = h.property_id AND date < ?)
               AND (h.price_display != h_prev.price_display
                    OR h.status != h_prev.status
                    OR h.beds != h_prev.beds
                    OR h.baths != h_prev.baths
                    OR h.cars != h_prev.cars
                    OR h.land_size != h_prev.land_size)",
        )
        .bind::<Text, _>(to_ledger_date(target))
        .bind::<Text, _>(to_ledger_date(target))
        .load(&mut conn)?)
    }

    fn upsert_daily_summary(&self, summary: &DailySummary) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(daily_summary::table)
            .values(&DailySummaryDB::from(summary))
            .execute(&mut conn)?;
        Ok(())
    }

    fn daily_history(&self) -> Result<Vec<DailySummary>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<DailySummaryDB> = daily_summary::table
            .order(daily_summary::date.desc())
            .select(DailySummaryDB::as_select())
            .load(&mut conn)?;
        rows.into_iter()
            .map(|db| DailySummary::try_from(db).map_err(crate::errors::Error::Ledger))
            .collect()
    }
}
