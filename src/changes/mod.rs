pub(crate) mod changes_model;
pub(crate) mod changes_repository;
pub(crate) mod changes_service;
pub(crate) mod changes_traits;

// Re-export the public interface
pub use changes_model::{
    Adjustment, AdjustmentRow, ChangeRow, DailyChanges, DailySummary, ListingChange, PairRow,
    PriceChange,
};
pub use changes_repository::ChangeRepository;
pub use changes_service::ChangeService;
pub use changes_traits::{ChangeRepositoryTrait, ChangeServiceTrait};
