use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::trends_traits::TrendRepositoryTrait;
use crate::db::get_connection;
use crate::errors::Result;
use crate::utils::date_utils::to_ledger_date;

#[derive(QueryableByName, Debug)]
struct SampleRow {
    #[diesel(sql_type = diesel::sql_types::Double)]
    price_per_m2: f64,
}

pub struct TrendRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TrendRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        TrendRepository { pool }
    }
}

impl TrendRepositoryTrait for TrendRepository {
    /// Sold price-per-m² samples for one suburb with the sale date inside
    /// `[from, to)`. Rows without a parsed sale date or a derived price/m²
    /// never qualify.
    fn suburb_samples(&self, suburb: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<f64>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<SampleRow> = diesel::sql_query(
            "SELECT h.price_per_m2
             FROM listing_history h
             JOIN properties p ON h.property_id = p.property_id
             WHERE h.status = 'SOLD'
               AND h.price_per_m2 > 0
               AND h.sold_date_iso >= ? AND h.sold_date_iso < ?
               AND UPPER(p.suburb) = UPPER(?)",
        )
        .bind::<Text, _>(to_ledger_date(from))
        .bind::<Text, _>(to_ledger_date(to))
        .bind::<Text, _>(suburb)
        .load(&mut conn)?;
        Ok(rows.into_iter().map(|r| r.price_per_m2).collect())
    }

    /// The same window across every suburb, used as the thin-data fallback.
    fn all_suburb_samples(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<f64>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<SampleRow> = diesel::sql_query(
            "SELECT h.price_per_m2
             FROM listing_history h
             WHERE h.status = 'SOLD'
               AND h.price_per_m2 > 0
               AND h.sold_date_iso >= ? AND h.sold_date_iso < ?",
        )
        .bind::<Text, _>(to_ledger_date(from))
        .bind::<Text, _>(to_ledger_date(to))
        .load(&mut conn)?;
        Ok(rows.into_iter().map(|r| r.price_per_m2).collect())
    }
}
