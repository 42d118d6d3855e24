use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{IngestController, ListingsController, MatchController, StatsController};

pub struct Router<'a> {
    match_controller: MatchController<'a>,
    listings_controller: ListingsController<'a>,
    ingest_controller: IngestController<'a>,
    stats_controller: StatsController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            match_controller: MatchController::new(container),
            listings_controller: ListingsController::new(container),
            ingest_controller: IngestController::new(container),
            stats_controller: StatsController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Match {
                resume,
                top_k,
                top_n,
                format,
            } => self.match_controller.run(resume, top_k, top_n, format).await,
            Commands::List {
                page,
                per_page,
                format,
            } => self.listings_controller.list(page, per_page, format).await,
            Commands::Scrape { terms } => self.ingest_controller.scrape(terms).await,
            Commands::Import { file } => self.ingest_controller.import(file).await,
            Commands::Stats => self.stats_controller.stats().await,
        }
    }
}
