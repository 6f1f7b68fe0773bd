pub mod db;

pub mod accuracy;
pub mod changes;
pub mod constants;
pub mod errors;
pub mod estimates;
pub mod listings;
pub mod schema;
pub mod trends;
pub mod utils;

pub use changes::*;
pub use listings::*;
