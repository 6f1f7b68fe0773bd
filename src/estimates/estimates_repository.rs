use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::estimates_model::{
    EstimateHistoryRow, EstimateRecord, PredictionHistoryRow, PredictionRecord,
};
use super::estimates_traits::{EstimateRepositoryTrait, PredictionRepositoryTrait};
use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::{estimates, estimates_history, predictions, predictions_history};

pub struct PredictionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PredictionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        PredictionRepository { pool }
    }
}

impl PredictionRepositoryTrait for PredictionRepository {
    /// Upsert the current prediction and append it to the history table.
    /// The history keeps one row per (property, produced_at).
    fn save(&self, record: &PredictionRecord) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::replace_into(predictions::table)
                .values(record)
                .execute(conn)?;
            diesel::replace_into(predictions_history::table)
                .values(&PredictionHistoryRow::from(record))
                .execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }

    fn save_batch(&self, records: &[PredictionRecord]) -> Result<usize> {
        for record in records {
            self.save(record)?;
        }
        Ok(records.len())
    }

    fn latest(&self, property_id: &str) -> Result<Option<PredictionRecord>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(predictions::table
            .find(property_id)
            .select(PredictionRecord::as_select())
            .first(&mut conn)
            .optional()?)
    }
}

pub struct EstimateRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl EstimateRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        EstimateRepository { pool }
    }
}

impl EstimateRepositoryTrait for EstimateRepository {
    fn save(&self, record: &EstimateRecord) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::replace_into(estimates::table)
                .values(record)
                .execute(conn)?;
            diesel::replace_into(estimates_history::table)
                .values(&EstimateHistoryRow::from(record))
                .execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }

    fn latest(&self, property_id: &str) -> Result<Option<EstimateRecord>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(estimates::table
            .find(property_id)
            .select(EstimateRecord::as_select())
            .first(&mut conn)
            .optional()?)
    }
}
