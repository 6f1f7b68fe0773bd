use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

use super::changes_model::{
    Adjustment, DailyChanges, DailySummary, ListingChange, PairRow, PriceChange,
};
use super::changes_traits::{ChangeRepositoryTrait, ChangeServiceTrait};
use crate::errors::Result;
use crate::utils::date_utils::from_ledger_date;
use crate::utils::price_utils::normalize_display;

pub struct ChangeService<R: ChangeRepositoryTrait> {
    repo: Arc<R>,
}

impl<R: ChangeRepositoryTrait> ChangeService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        ChangeService { repo }
    }

    /// Sort a pair of FOR_SALE observations into PRICE_CHANGE or
    /// GUIDE_REVEALED, or neither.
    ///
    /// A pair whose normalized displays are equal is never a change, no
    /// matter what the strings look like. After that:
    /// known -> different known is a price change with a signed diff;
    /// unknown -> known is a revealed guide, reported separately;
    /// known -> unknown is a hidden price, a price change with no diff.
    fn classify_pair(pair: PairRow) -> Result<Option<PairClass>> {
        let old_norm = normalize_display(&pair.old_price_display);
        let new_norm = normalize_display(&pair.price_display);
        if old_norm == new_norm {
            return Ok(None);
        }

        let date = from_ledger_date(&pair.date).ok_or_else(|| {
            crate::errors::Error::Ledger(crate::listings::LedgerError::InvalidDate(
                pair.date.clone(),
            ))
        })?;

        let old_value = pair.old_price_value;
        let new_value = pair.price_value;
        let change = PriceChange {
            property_id: pair.property_id,
            address: pair.address,
            suburb: pair.suburb,
            url: pair.url,
            date,
            old_display: pair.old_price_display,
            new_display: pair.price_display,
            old_value,
            new_value,
            diff: None,
        };

        if old_value > 0 && new_value > 0 && old_value != new_value {
            Ok(Some(PairClass::PriceChange(PriceChange {
                diff: Some(new_value - old_value),
                ..change
            })))
        } else if old_value == 0 && new_value > 0 {
            Ok(Some(PairClass::GuideRevealed(change)))
        } else if new_value == 0 && old_value > 0 {
            // Price hidden (e.g. "Contact Agent")
            Ok(Some(PairClass::PriceChange(change)))
        } else {
            Ok(None)
        }
    }
}

enum PairClass {
    PriceChange(PriceChange),
    GuideRevealed(PriceChange),
}

impl<R: ChangeRepositoryTrait> ChangeServiceTrait for ChangeService<R> {
    /// The typed day-over-day feed for `target`, compared against the most
    /// recent capture date before it. With no baseline at all, every
    /// FOR_SALE snapshot on `target` is NEW and no other category applies.
    fn daily_changes(&self, target: NaiveDate) -> Result<DailyChanges> {
        let prev = self.repo.previous_capture_date(target)?;

        let Some(prev) = prev else {
            let mut changes = DailyChanges::empty(target, None);
            for row in self.repo.for_sale_on(target)? {
                changes
                    .new
                    .push(ListingChange::try_from(row).map_err(crate::errors::Error::Ledger)?);
            }
            return Ok(changes);
        };

        let mut changes = DailyChanges::empty(target, Some(prev));

        for row in self.repo.new_listings_on(target)? {
            changes
                .new
                .push(ListingChange::try_from(row).map_err(crate::errors::Error::Ledger)?);
        }
        for row in self.repo.sold_transitions(target, prev)? {
            changes
                .sold_transitions
                .push(ListingChange::try_from(row).map_err(crate::errors::Error::Ledger)?);
        }
        for row in self.repo.disappeared(prev, target)? {
            changes
                .disappeared
                .push(ListingChange::try_from(row).map_err(crate::errors::Error::Ledger)?);
        }
        for pair in self.repo.for_sale_pairs(target, prev)? {
            match Self::classify_pair(pair)? {
                Some(PairClass::PriceChange(change)) => changes.price_changes.push(change),
                Some(PairClass::GuideRevealed(change)) => changes.guide_revealed.push(change),
                None => {}
            }
        }

        Ok(changes)
    }

    fn adjustments(&self, target: NaiveDate) -> Result<Vec<Adjustment>> {
        self.repo
            .adjustments_on(target)?
            .into_iter()
            .map(|row| Adjustment::try_from(row).map_err(crate::errors::Error::Ledger))
            .collect()
    }

    /// Compute and overwrite the tally row for `target`. NEW and ADJUSTMENT
    /// come from their own computations; "sold" counts explicit transitions
    /// plus listings that vanished.
    fn update_daily_summary(&self, target: NaiveDate) -> Result<DailySummary> {
        let changes = self.daily_changes(target)?;
        let adjustments = self.adjustments(target)?;

        let summary = DailySummary {
            date: target,
            new_count: changes.new.len() as i32,
            sold_count: (changes.sold_transitions.len() + changes.disappeared.len()) as i32,
            adj_count: adjustments.len() as i32,
        };
        self.repo.upsert_daily_summary(&summary)?;

        info!(
            "Daily summary for {}: {} new, {} sold/gone, {} adjusted",
            target, summary.new_count, summary.sold_count, summary.adj_count
        );

        Ok(summary)
    }

    fn daily_history(&self) -> Result<Vec<DailySummary>> {
        self.repo.daily_history()
    }
}
