pub(crate) mod estimates_model;
pub(crate) mod estimates_repository;
pub(crate) mod estimates_traits;

pub use estimates_model::{EstimateRecord, PredictionRecord};
pub use estimates_repository::{EstimateRepository, PredictionRepository};
pub use estimates_traits::{EstimateRepositoryTrait, PredictionRepositoryTrait};
