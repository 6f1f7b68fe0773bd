use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Price prediction produced by the external valuation model.
/// Current value per property, with every version appended to history.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable, Selectable, QueryableByName)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::predictions)]
#[diesel(primary_key(property_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PredictionRecord {
    pub property_id: String,
    pub predicted_price: i64,
    pub range_low: Option<i64>,
    pub range_high: Option<i64>,
    pub produced_at: String,
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Insertable, Selectable, QueryableByName)]
#[diesel(table_name = crate::schema::predictions_history)]
#[diesel(primary_key(property_id, produced_at))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PredictionHistoryRow {
    pub property_id: String,
    pub produced_at: String,
    pub predicted_price: i64,
    pub range_low: Option<i64>,
    pub range_high: Option<i64>,
    pub model_version: Option<String>,
}

impl From<&PredictionRecord> for PredictionHistoryRow {
    fn from(r: &PredictionRecord) -> Self {
        PredictionHistoryRow {
            property_id: r.property_id.clone(),
            produced_at: r.produced_at.clone(),
            predicted_price: r.predicted_price,
            range_low: r.range_low,
            range_high: r.range_high,
            model_version: r.model_version.clone(),
        }
    }
}

/// Third-party portal estimate for a property, scraped by an external
/// collaborator. Low/mid/high may each be absent.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable, Selectable, QueryableByName)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::estimates)]
#[diesel(primary_key(property_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EstimateRecord {
    pub property_id: String,
    pub estimate_low: Option<i64>,
    pub estimate_mid: Option<i64>,
    pub estimate_high: Option<i64>,
    pub produced_at: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Insertable, Selectable, QueryableByName)]
#[diesel(table_name = crate::schema::estimates_history)]
#[diesel(primary_key(property_id, produced_at))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EstimateHistoryRow {
    pub property_id: String,
    pub produced_at: String,
    pub estimate_low: Option<i64>,
    pub estimate_mid: Option<i64>,
    pub estimate_high: Option<i64>,
}

impl From<&EstimateRecord> for EstimateHistoryRow {
    fn from(r: &EstimateRecord) -> Self {
        EstimateHistoryRow {
            property_id: r.property_id.clone(),
            produced_at: r.produced_at.clone(),
            estimate_low: r.estimate_low,
            estimate_mid: r.estimate_mid,
            estimate_high: r.estimate_high,
        }
    }
}
