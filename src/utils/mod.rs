pub mod date_utils;
pub mod price_utils;
