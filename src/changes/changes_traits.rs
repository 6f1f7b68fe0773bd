use chrono::NaiveDate;

use super::changes_model::{
    Adjustment, AdjustmentRow, ChangeRow, DailyChanges, DailySummary, PairRow,
};
use crate::errors::Result;

pub trait ChangeRepositoryTrait: Send + Sync {
    fn previous_capture_date(&self, target: NaiveDate) -> Result<Option<NaiveDate>>;
    fn new_listings_on(&self, target: NaiveDate) -> Result<Vec<ChangeRow>>;
    fn for_sale_on(&self, target: NaiveDate) -> Result<Vec<ChangeRow>>;
    fn sold_transitions(&self, target: NaiveDate, prev: NaiveDate) -> Result<Vec<ChangeRow>>;
    fn disappeared(&self, prev: NaiveDate, target: NaiveDate) -> Result<Vec<ChangeRow>>;
    fn for_sale_pairs(&self, target: NaiveDate, prev: NaiveDate) -> Result<Vec<PairRow>>;
    fn adjustments_on(&self, target: NaiveDate) -> Result<Vec<AdjustmentRow>>;
    fn upsert_daily_summary(&self, summary: &DailySummary) -> Result<()>;
    fn daily_history(&self) -> Result<Vec<DailySummary>>;
}

pub trait ChangeServiceTrait: Send + Sync {
    fn daily_changes(&self, target: NaiveDate) -> Result<DailyChanges>;
    fn adjustments(&self, target: NaiveDate) -> Result<Vec<Adjustment>>;
    fn update_daily_summary(&self, target: NaiveDate) -> Result<DailySummary>;
    fn daily_history(&self) -> Result<Vec<DailySummary>>;
}
