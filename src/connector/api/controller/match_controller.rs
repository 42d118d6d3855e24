use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::connector::adapter::read_resume;
use crate::domain::RankedListing;

use super::super::Container;

#[derive(Serialize)]
struct MatchView<'a> {
    id: &'a str,
    title: &'a str,
    company_name: &'a str,
    link: &'a str,
    match_score: u8,
    reason: &'a str,
}

impl<'a> From<&'a RankedListing> for MatchView<'a> {
    fn from(ranked: &'a RankedListing) -> Self {
        let listing = ranked.listing();
        Self {
            id: listing.id(),
            title: listing.title(),
            company_name: listing.company_name(),
            link: listing.link(),
            match_score: ranked.score(),
            reason: ranked.reason(),
        }
    }
}

pub struct MatchController<'a> {
    container: &'a Container,
}

impl<'a> MatchController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn run(
        &self,
        resume: PathBuf,
        top_k: Option<usize>,
        top_n: Option<usize>,
        format: OutputFormat,
    ) -> Result<String> {
        let resume_text = read_resume(&resume)?;
        let corpus = self.container.list_use_case().execute().await?;

        let mut ranking = self.container.ranking_config().clone();
        if let Some(k) = top_k {
            ranking = ranking.with_top_k_filter(k);
        }
        if let Some(n) = top_n {
            ranking = ranking.with_top_n_result(n);
        }

        let use_case = self.container.rank_use_case(ranking)?;
        let matches = use_case.execute(&resume_text, &corpus).await?;

        Ok(match format {
            OutputFormat::Json => {
                let views: Vec<MatchView> = matches.iter().map(MatchView::from).collect();
                serde_json::to_string_pretty(&views)?
            }
            OutputFormat::Text => format_matches(&matches),
        })
    }
}

pub(crate) fn format_matches(matches: &[RankedListing]) -> String {
    if matches.is_empty() {
        return "No matches found.".to_string();
    }

    let mut output = format!("Top {} matches:\n\n", matches.len());
    for (i, ranked) in matches.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, ranked.display_line()));
        if !ranked.reason().is_empty() {
            output.push_str(&format!("   Reason: {}\n", ranked.reason()));
        }
        output.push_str(&format!("   Apply:  {}\n\n", ranked.listing().link()));
    }
    output
}
