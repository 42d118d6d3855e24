mod chat_client;
mod embedding_service;
mod listing_repository;
mod listing_source;

pub use chat_client::*;
pub use embedding_service::*;
pub use listing_repository::*;
pub use listing_source::*;
