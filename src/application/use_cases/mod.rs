mod ingest_listings;
mod list_listings;
mod llm_ranker;
mod match_parser;
mod rank_candidates;
mod shortlist_prompt;
mod similarity_filter;

pub use ingest_listings::*;
pub use list_listings::*;
pub use llm_ranker::*;
pub use match_parser::*;
pub use rank_candidates::*;
pub use shortlist_prompt::*;
pub use similarity_filter::*;
