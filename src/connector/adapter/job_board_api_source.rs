use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ListingSource;
use crate::domain::{DomainError, RawListing};

/// Default target: a JobSpy HTTP wrapper running locally.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/search_jobs";
/// Scrapes are slow; each term can take minutes across two boards.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Search parameters in the scraper service's request format.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    site_name: Vec<String>,
    search_term: String,
    google_search_term: String,
    location: String,
    results_wanted: u32,
    hours_old: u32,
    country_indeed: String,
}

impl SearchRequest {
    /// Internship searches across LinkedIn and Google Jobs in India, last week.
    pub fn for_term(term: &str) -> Self {
        Self {
            site_name: vec!["linkedin".to_string(), "google".to_string()],
            search_term: term.to_string(),
            google_search_term: format!("{term} in India"),
            location: "India".to_string(),
            results_wanted: 200,
            hours_old: 168,
            country_indeed: "INDIA".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Rows(Vec<RawListing>),
    Wrapped { jobs: Vec<RawListing> },
}

impl SearchResponse {
    fn into_rows(self) -> Vec<RawListing> {
        match self {
            SearchResponse::Rows(rows) | SearchResponse::Wrapped { jobs: rows } => rows,
        }
    }
}

/// Fetches postings from a JobSpy-compatible scraper service over HTTP.
///
/// | Variable           | Default                                        |
/// |--------------------|------------------------------------------------|
/// | `JOBBOARD_API_URL` | `http://localhost:8000/api/v1/search_jobs`     |
pub struct JobBoardApiSource {
    client: reqwest::Client,
    url: String,
}

impl JobBoardApiSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    pub fn from_env() -> Self {
        let url = std::env::var("JOBBOARD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(url)
    }
}

fn parse_response(body: &str) -> Result<Vec<RawListing>, DomainError> {
    serde_json::from_str::<SearchResponse>(body)
        .map(SearchResponse::into_rows)
        .map_err(|e| DomainError::source(format!("unexpected scraper response: {e}")))
}

#[async_trait]
impl ListingSource for JobBoardApiSource {
    async fn fetch(&self, search_term: &str) -> Result<Vec<RawListing>, DomainError> {
        let request = SearchRequest::for_term(search_term);
        debug!("POST {} {:?}", self.url, request);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::source(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::source(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            warn!("Scraper service returned {status}: {body}");
            return Err(DomainError::source(format!("scraper returned {status}")));
        }

        let rows = parse_response(&body)?;
        debug!("Scraper returned {} rows for {}", rows.len(), search_term);
        Ok(rows)
    }

    fn name(&self) -> &str {
        "jobspy-api"
    }
}
