pub(crate) mod accuracy_model;
pub(crate) mod accuracy_repository;
pub(crate) mod accuracy_service;
pub(crate) mod accuracy_traits;

// Re-export the public interface
pub use accuracy_model::{
    AccuracyComparison, AccuracyReport, AskingRow, ComparisonSource, SoldRow, SourceAccuracy,
};
pub use accuracy_repository::AccuracyRepository;
pub use accuracy_service::AccuracyService;
pub use accuracy_traits::{AccuracyRepositoryTrait, AccuracyServiceTrait};
