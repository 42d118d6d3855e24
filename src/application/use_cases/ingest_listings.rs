use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::application::{ListingRepository, ListingSource};
use crate::domain::{DomainError, IngestReport, RawListing};

/// Search terms used when none are given.
pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "software intern",
    "summer internship",
    "internship",
    "Software Internship",
];

/// Pulls raw postings from a source (or a file export) and upserts them into
/// the listing store by normalized link.
pub struct IngestListingsUseCase {
    listing_repo: Arc<dyn ListingRepository>,
    source: Option<Arc<dyn ListingSource>>,
    show_progress: bool,
}

impl IngestListingsUseCase {
    pub fn new(listing_repo: Arc<dyn ListingRepository>) -> Self {
        Self {
            listing_repo,
            source: None,
            show_progress: false,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ListingSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Scrapes every term in turn. A term whose fetch fails is logged and
    /// recorded in the report; the run carries on with the next term.
    /// Storage errors abort the run.
    pub async fn scrape(&self, terms: &[String]) -> Result<IngestReport, DomainError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| DomainError::invalid_input("No listing source configured"))?;

        let start_time = Instant::now();
        let mut report = IngestReport::default();

        for term in terms {
            info!("Scraping internships for: {} (via {})", term, source.name());

            let rows = match source.fetch(term).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Error scraping {}: {}", term, e);
                    report.failed_terms.push(term.clone());
                    continue;
                }
            };

            if rows.is_empty() {
                info!("No jobs found for {}", term);
                continue;
            }

            self.upsert_rows(&rows, &mut report).await?;
        }

        info!(
            "Scrape finished in {:.2}s: {}",
            start_time.elapsed().as_secs_f64(),
            report.summary()
        );

        Ok(report)
    }

    /// Upserts rows from an offline export.
    pub async fn import(&self, rows: &[RawListing]) -> Result<IngestReport, DomainError> {
        let mut report = IngestReport::default();
        self.upsert_rows(rows, &mut report).await?;
        info!("Import finished: {}", report.summary());
        Ok(report)
    }

    async fn upsert_rows(
        &self,
        rows: &[RawListing],
        report: &mut IngestReport,
    ) -> Result<(), DomainError> {
        let progress_bar = if self.show_progress {
            let bar = ProgressBar::new(rows.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        for row in rows {
            progress_bar.set_message(row.title().to_string());

            if row.link().is_none() {
                debug!("Skipping row without link: {}", row.title());
                report.skipped += 1;
                progress_bar.inc(1);
                continue;
            }

            let outcome = self.listing_repo.upsert_by_link(row).await?;
            debug!("Upserted listing {} ({:?})", outcome.id(), outcome);
            report.record(&outcome);
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::connector::adapter::InMemoryListingRepository;

    struct FakeSource {
        by_term: HashMap<String, Result<Vec<RawListing>, String>>,
    }

    #[async_trait]
    impl ListingSource for FakeSource {
        async fn fetch(&self, search_term: &str) -> Result<Vec<RawListing>, DomainError> {
            match self.by_term.get(search_term) {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(e)) => Err(DomainError::source(e.clone())),
                None => Ok(Vec::new()),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn row(title: &str, link: &str) -> RawListing {
        RawListing::new(title, "Acme", "desc", link).with_source("linkedin")
    }

    #[tokio::test]
    async fn test_scrape_upserts_and_survives_failing_terms() {
        let mut by_term = HashMap::new();
        by_term.insert(
            "software intern".to_string(),
            Ok(vec![
                row("Backend Intern", "https://jobs.example.com/1"),
                row("Frontend Intern", "https://jobs.example.com/2"),
            ]),
        );
        by_term.insert("internship".to_string(), Err("rate limited".to_string()));
        by_term.insert(
            "summer internship".to_string(),
            Ok(vec![
                row("Backend Intern (updated)", "https://jobs.example.com/1/?utm_source=x"),
                row("No link", ""),
            ]),
        );

        let repo = Arc::new(InMemoryListingRepository::new());
        let use_case = IngestListingsUseCase::new(repo.clone())
            .with_source(Arc::new(FakeSource { by_term }));
        let terms: Vec<String> = DEFAULT_SEARCH_TERMS.iter().map(|t| t.to_string()).collect();

        let report = use_case.scrape(&terms).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed_terms, vec!["internship".to_string()]);
        assert_eq!(repo.count().await.unwrap(), 2);

        let updated = repo
            .find_by_link("https://jobs.example.com/1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title(), "Backend Intern (updated)");
    }

    #[tokio::test]
    async fn test_scrape_without_source_is_invalid_input() {
        let use_case = IngestListingsUseCase::new(Arc::new(InMemoryListingRepository::new()));
        let err = use_case.scrape(&["internship".to_string()]).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let repo = Arc::new(InMemoryListingRepository::new());
        let use_case = IngestListingsUseCase::new(repo.clone());
        let rows = vec![row("A", "https://a.b/1"), row("B", "https://a.b/2")];

        let first = use_case.import(&rows).await.unwrap();
        let second = use_case.import(&rows).await.unwrap();

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
