use super::estimates_model::{EstimateRecord, PredictionRecord};
use crate::errors::Result;

pub trait PredictionRepositoryTrait: Send + Sync {
    fn save(&self, record: &PredictionRecord) -> Result<()>;
    fn save_batch(&self, records: &[PredictionRecord]) -> Result<usize>;
    fn latest(&self, property_id: &str) -> Result<Option<PredictionRecord>>;
}

pub trait EstimateRepositoryTrait: Send + Sync {
    fn save(&self, record: &EstimateRecord) -> Result<()>;
    fn latest(&self, property_id: &str) -> Result<Option<EstimateRecord>>;
}
