use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::accuracy_model::{AskingRow, SoldRow};
use super::accuracy_traits::AccuracyRepositoryTrait;
use crate::db::get_connection;
use crate::errors::Result;
use crate::estimates::estimates_model::{EstimateRecord, PredictionRecord};
use crate::utils::date_utils::to_ledger_date;

pub struct AccuracyRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl AccuracyRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        AccuracyRepository { pool }
    }
}

impl AccuracyRepositoryTrait for AccuracyRepository {
    fn sold_with_known_price(&self) -> Result<Vec<SoldRow>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::sql_query(
            "SELECT p.property_id, p.address, p.suburb,
                    h.price_value AS sold_price, h.sold_date, h.sold_date_iso,
                    h.date AS record_date, h.beds, h.baths, h.cars, h.property_type
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             WHERE h.status = 'SOLD' AND h.price_value > 0
             ORDER BY h.sold_date_iso DESC, h.date DESC",
        )
        .load(&mut conn)?)
    }

    /// The latest FOR_SALE snapshot dated strictly before `before`: the
    /// final asking price while the listing was still on the market.
    fn last_asking_before(&self, property_id: &str, before: NaiveDate) -> Result<Option<AskingRow>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<AskingRow> = diesel::sql_query(
            "SELECT price_value, price_display, date
             FROM listing_history
             WHERE property_id = ? AND status = 'FOR_SALE' AND date < ?
             ORDER BY date DESC
             LIMIT 1",
        )
        .bind::<Text, _>(property_id)
        .bind::<Text, _>(to_ledger_date(before))
        .load(&mut conn)?;
        Ok(rows.into_iter().next())
    }

    /// The newest model prediction produced strictly before `cutoff`.
    /// History rows are preferred; the current row qualifies only when its
    /// own timestamp predates the cutoff. Rows at or after the cutoff never
    /// surface.
    fn latest_prediction_before(
        &self,
        property_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Option<PredictionRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let cutoff = to_ledger_date(cutoff);

        let from_history: Vec<PredictionRecord> = diesel::sql_query(
            "SELECT property_id, predicted_price, range_low, range_high,
                    produced_at, model_version
             FROM predictions_history
             WHERE property_id = ? AND substr(produced_at, 1, 10) < ?
             ORDER BY produced_at DESC
             LIMIT 1",
        )
        .bind::<Text, _>(property_id)
        .bind::<Text, _>(&cutoff)
        .load(&mut conn)?;
        if let Some(record) = from_history.into_iter().next() {
            return Ok(Some(record));
        }

        let current: Vec<PredictionRecord> = diesel::sql_query(
            "SELECT property_id, predicted_price, range_low, range_high,
                    produced_at, model_version
             FROM predictions
             WHERE property_id = ? AND substr(produced_at, 1, 10) < ?",
        )
        .bind::<Text, _>(property_id)
        .bind::<Text, _>(&cutoff)
        .load(&mut conn)?;
        Ok(current.into_iter().next())
    }

    /// Same cutoff discipline for portal estimates.
    fn latest_estimate_before(
        &self,
        property_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Option<EstimateRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let cutoff = to_ledger_date(cutoff);

        let from_history: Vec<EstimateRecord> = diesel::sql_query(
            "SELECT property_id, estimate_low, estimate_mid, estimate_high, produced_at
             FROM estimates_history
             WHERE property_id = ? AND substr(produced_at, 1, 10) < ?
             ORDER BY produced_at DESC
             LIMIT 1",
        )
        .bind::<Text, _>(property_id)
        .bind::<Text, _>(&cutoff)
        .load(&mut conn)?;
        if let Some(record) = from_history.into_iter().next() {
            return Ok(Some(record));
        }

        let current: Vec<EstimateRecord> = diesel::sql_query(
            "SELECT property_id, estimate_low, estimate_mid, estimate_high, produced_at
             FROM estimates
             WHERE property_id = ? AND substr(produced_at, 1, 10) < ?",
        )
        .bind::<Text, _>(property_id)
        .bind::<Text, _>(&cutoff)
        .load(&mut conn)?;
        Ok(current.into_iter().next())
    }
}
