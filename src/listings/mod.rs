pub(crate) mod listings_errors;
pub(crate) mod listings_model;
pub(crate) mod listings_repository;
pub(crate) mod listings_service;
pub(crate) mod listings_traits;

// Re-export the public interface
pub use listings_model::{
    CatchmentProperty, CatchmentUpdate, IngestRecord, IngestSummary, ListingSnapshot,
    ListingStatus, ListingView, MarketStats, Property, SuburbCount, UpsertOutcome, UpsertResult,
};
pub use listings_repository::LedgerRepository;
pub use listings_service::LedgerService;
pub use listings_traits::{LedgerRepositoryTrait, LedgerServiceTrait};

// Re-export error type for convenience
pub use listings_errors::LedgerError;
