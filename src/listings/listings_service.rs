use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

use super::listings_model::{
    CatchmentUpdate, IngestRecord, IngestSummary, ListingSnapshot, ListingStatus, ListingView,
    MarketStats, Property, UpsertOutcome,
};
use super::listings_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::Result;

pub struct LedgerService<R: LedgerRepositoryTrait> {
    repo: Arc<R>,
}

impl<R: LedgerRepositoryTrait> LedgerService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        LedgerService { repo }
    }
}

impl<R: LedgerRepositoryTrait> LedgerServiceTrait for LedgerService<R> {
    /// Persist one capture cycle's worth of normalized records. Each record
    /// commits on its own; downstream readers must not be pointed at
    /// `capture_date` until this call returns.
    fn ingest_batch(
        &self,
        records: &[IngestRecord],
        capture_date: NaiveDate,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary {
            capture_date,
            records: records.len(),
            created_properties: 0,
            inserted: 0,
            replaced: 0,
            skipped_sold: 0,
        };

        for record in records {
            let result = self.repo.upsert_snapshot(record, capture_date)?;
            if result.created_property {
                summary.created_properties += 1;
            }
            match result.outcome {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Replaced => summary.replaced += 1,
                UpsertOutcome::SkippedExistingSold => {
                    debug!("Skipping already-sold property {}", record.id);
                    summary.skipped_sold += 1;
                }
            }
        }

        info!(
            "Ingested batch for {}: {} records ({} new properties, {} inserted, {} replaced, {} sold skipped)",
            capture_date,
            summary.records,
            summary.created_properties,
            summary.inserted,
            summary.replaced,
            summary.skipped_sold
        );

        Ok(summary)
    }

    fn get_property(&self, id: &str) -> Result<Option<Property>> {
        self.repo.get_property(id)
    }

    fn property_history(&self, id: &str) -> Result<Vec<ListingSnapshot>> {
        self.repo.history_for_property(id)
    }

    fn latest_listings(&self, status: ListingStatus) -> Result<Vec<ListingView>> {
        self.repo.latest_views_by_status(status)
    }

    fn update_catchment_flags(&self, ids: &HashSet<String>) -> Result<CatchmentUpdate> {
        let update = self.repo.update_catchment_flags(ids)?;
        info!(
            "Catchment update: {} ids supplied, {} matched ({} for sale, {} sold)",
            update.ids_supplied,
            update.matched,
            update.for_sale.len(),
            update.sold.len()
        );
        Ok(update)
    }

    fn market_stats(&self) -> Result<MarketStats> {
        self.repo.market_stats()
    }
}
