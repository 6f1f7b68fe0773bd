use chrono::NaiveDate;
use std::collections::HashSet;

use super::listings_model::{
    CatchmentUpdate, IngestRecord, IngestSummary, ListingSnapshot, ListingStatus, ListingView,
    MarketStats, Property, UpsertResult,
};
use crate::errors::Result;

pub trait LedgerRepositoryTrait: Send + Sync {
    fn upsert_snapshot(
        &self,
        record: &IngestRecord,
        capture_date: NaiveDate,
    ) -> Result<UpsertResult>;
    fn get_property(&self, id: &str) -> Result<Option<Property>>;
    fn snapshot(
        &self,
        id: &str,
        date: NaiveDate,
        status: ListingStatus,
    ) -> Result<Option<ListingSnapshot>>;
    fn history_for_property(&self, id: &str) -> Result<Vec<ListingSnapshot>>;
    fn latest_views_by_status(&self, status: ListingStatus) -> Result<Vec<ListingView>>;
    fn update_catchment_flags(&self, ids: &HashSet<String>) -> Result<CatchmentUpdate>;
    fn market_stats(&self) -> Result<MarketStats>;
}

pub trait LedgerServiceTrait: Send + Sync {
    fn ingest_batch(
        &self,
        records: &[IngestRecord],
        capture_date: NaiveDate,
    ) -> Result<IngestSummary>;
    fn get_property(&self, id: &str) -> Result<Option<Property>>;
    fn property_history(&self, id: &str) -> Result<Vec<ListingSnapshot>>;
    fn latest_listings(&self, status: ListingStatus) -> Result<Vec<ListingView>>;
    fn update_catchment_flags(&self, ids: &HashSet<String>) -> Result<CatchmentUpdate>;
    fn market_stats(&self) -> Result<MarketStats>;
}
