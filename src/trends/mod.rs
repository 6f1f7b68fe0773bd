pub(crate) mod trends_repository;
pub(crate) mod trends_service;
pub(crate) mod trends_traits;

pub use trends_repository::TrendRepository;
pub use trends_service::TrendService;
pub use trends_traits::{TrendRepositoryTrait, TrendServiceTrait};
