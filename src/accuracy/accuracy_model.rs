use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// The three estimate sources compared against each sale, in the order they
/// are checked. Order matters: ties on absolute error keep the
/// first-checked source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonSource {
    Listed,
    Model,
    PortalEstimate,
}

impl ComparisonSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonSource::Listed => "LISTED",
            ComparisonSource::Model => "MODEL",
            ComparisonSource::PortalEstimate => "PORTAL_ESTIMATE",
        }
    }
}

/// Raw sold row feeding the evaluator.
#[derive(QueryableByName, Debug, Clone)]
pub struct SoldRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub property_id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub address: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub suburb: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub sold_price: i64,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub sold_date: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub sold_date_iso: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub record_date: String,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub beds: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub baths: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub cars: i32,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub property_type: Option<String>,
}

/// Final asking price of a property before it sold.
#[derive(QueryableByName, Debug, Clone)]
pub struct AskingRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub price_value: i64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub price_display: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub date: String,
}

/// One sold property against up to three prior estimates. Derived only,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyComparison {
    pub property_id: String,
    pub address: String,
    pub suburb: String,
    pub sold_price: i64,
    pub sold_date: Option<String>,
    /// The sale event date used for every no-look-ahead cutoff.
    pub sale_date: NaiveDate,
    pub record_date: NaiveDate,
    pub beds: i32,
    pub baths: i32,
    pub cars: i32,
    pub property_type: Option<String>,
    pub listed_price: Option<i64>,
    pub listed_display: Option<String>,
    pub listed_error_pct: Option<f64>,
    pub model_price: Option<i64>,
    pub model_date: Option<String>,
    pub model_error_pct: Option<f64>,
    pub portal_estimate: Option<i64>,
    pub portal_date: Option<String>,
    pub portal_error_pct: Option<f64>,
    pub winner: Option<ComparisonSource>,
}

/// Aggregate error statistics for one source.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceAccuracy {
    pub count: usize,
    pub mape: Option<f64>,
    pub median_error: Option<f64>,
}

/// Full evaluator output: the comparison list plus per-source aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    pub total_sold: usize,
    pub with_comparisons: usize,
    pub comparisons: Vec<AccuracyComparison>,
    pub listed: SourceAccuracy,
    pub model: SourceAccuracy,
    pub portal: SourceAccuracy,
}
