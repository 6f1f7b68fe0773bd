use chrono::NaiveDate;

use super::accuracy_model::{AccuracyReport, AskingRow, SoldRow};
use crate::errors::Result;
use crate::estimates::estimates_model::{EstimateRecord, PredictionRecord};

pub trait AccuracyRepositoryTrait: Send + Sync {
    fn sold_with_known_price(&self) -> Result<Vec<SoldRow>>;
    fn last_asking_before(&self, property_id: &str, before: NaiveDate)
        -> Result<Option<AskingRow>>;
    fn latest_prediction_before(
        &self,
        property_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Option<PredictionRecord>>;
    fn latest_estimate_before(
        &self,
        property_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Option<EstimateRecord>>;
}

pub trait AccuracyServiceTrait: Send + Sync {
    fn accuracy_report(&self) -> Result<AccuracyReport>;
}
