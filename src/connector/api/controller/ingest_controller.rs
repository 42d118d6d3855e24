use std::path::PathBuf;

use anyhow::Result;

use crate::application::DEFAULT_SEARCH_TERMS;
use crate::connector::adapter::read_raw_listings;
use crate::domain::IngestReport;

use super::super::Container;

pub struct IngestController<'a> {
    container: &'a Container,
}

impl<'a> IngestController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn scrape(&self, terms: Vec<String>) -> Result<String> {
        let terms = if terms.is_empty() {
            DEFAULT_SEARCH_TERMS.iter().map(|t| t.to_string()).collect()
        } else {
            terms
        };

        let report = self.container.ingest_use_case().scrape(&terms).await?;
        Ok(format_report(
            &format!("Scraped {} term(s) via {}", terms.len(), self.container.source_name()),
            &report,
        ))
    }

    pub async fn import(&self, file: PathBuf) -> Result<String> {
        let rows = read_raw_listings(&file)?;
        let report = self.container.ingest_use_case().import(&rows).await?;
        Ok(format_report(
            &format!("Imported {} row(s) from {}", rows.len(), file.display()),
            &report,
        ))
    }
}

fn format_report(heading: &str, report: &IngestReport) -> String {
    let mut output = format!(
        "{}\n  Inserted: {}\n  Updated:  {}\n  Skipped:  {}\n",
        heading, report.inserted, report.updated, report.skipped
    );
    if !report.failed_terms.is_empty() {
        output.push_str(&format!("  Failed:   {}\n", report.failed_terms.join(", ")));
    }
    output
}
