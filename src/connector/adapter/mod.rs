mod anthropic_client;
mod duckdb_listing_repository;
mod in_memory_listing_repository;
mod job_board_api_source;
mod listing_file;
mod mock_chat_client;
mod mock_embedding;
mod ort_embedding;
mod resume_reader;

pub use anthropic_client::*;
pub use duckdb_listing_repository::*;
pub use in_memory_listing_repository::*;
pub use job_board_api_source::*;
pub use listing_file::*;
pub use mock_chat_client::*;
pub use mock_embedding::*;
pub use ort_embedding::*;
pub use resume_reader::*;
