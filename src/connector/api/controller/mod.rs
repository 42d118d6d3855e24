pub mod ingest_controller;
pub mod listings_controller;
pub mod match_controller;
pub mod stats_controller;

pub use ingest_controller::IngestController;
pub use listings_controller::ListingsController;
pub use match_controller::MatchController;
pub use stats_controller::StatsController;
