mod embedding;
mod ingest_report;
mod link;
mod listing;
mod listing_page;
mod match_result;
mod ranking_config;

pub use embedding::*;
pub use ingest_report::*;
pub use link::*;
pub use listing::*;
pub use listing_page::*;
pub use match_result::*;
pub use ranking_config::*;
