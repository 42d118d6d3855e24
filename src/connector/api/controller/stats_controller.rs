use anyhow::Result;
use chrono::DateTime;

use crate::Listing;

use super::super::Container;

pub struct StatsController<'a> {
    container: &'a Container,
}

impl<'a> StatsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn stats(&self) -> Result<String> {
        let listings = self.container.list_use_case().execute().await?;
        Ok(self.format_stats(&listings))
    }

    fn format_stats(&self, listings: &[Listing]) -> String {
        let newest = listings
            .iter()
            .filter_map(Listing::created_at)
            .max()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        let companies = {
            let mut names: Vec<&str> = listings
                .iter()
                .map(Listing::company_name)
                .filter(|c| !c.is_empty())
                .collect();
            names.sort_unstable();
            names.dedup();
            names.len()
        };
        let ranking = self.container.ranking_config();

        format!(
            "InternMatch Statistics\n======================\nListings:   {}\nCompanies:  {}\nNewest:     {}\nStorage:    {}\nData Dir:   {}\nModels:     {}\nShortlist:  top {} -> top {}",
            listings.len(),
            companies,
            newest,
            self.container.storage_kind(),
            self.container.data_dir(),
            if self.container.mock_models() { "mock" } else { "onnx + messages api" },
            ranking.top_k_filter(),
            ranking.top_n_result(),
        )
    }
}
