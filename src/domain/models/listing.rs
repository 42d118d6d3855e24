use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::normalize_link;

/// An internship posting as held by the listing store.
///
/// The `id` is assigned once at first sighting and never changes; later
/// sightings of the same (normalized) link update the mutable fields in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    id: String,
    title: String,
    company_name: String,
    description: String,
    link: String,
    source: Option<String>,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl Listing {
    /// Creates a listing from a scraped record, assigning a fresh identifier.
    pub fn from_raw(raw: &RawListing) -> Self {
        let now = current_timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            title: raw.title().to_string(),
            company_name: raw.company_name().to_string(),
            description: raw.description().to_string(),
            link: raw.link().unwrap_or_default().trim().to_string(),
            source: raw.source().map(str::to_string),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: String,
        title: String,
        company_name: String,
        description: String,
        link: String,
        source: Option<String>,
        created_at: Option<i64>,
        updated_at: Option<i64>,
    ) -> Self {
        Self {
            id,
            title,
            company_name,
            description,
            link,
            source,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Key used for the uniqueness check during ingestion.
    pub fn link_key(&self) -> String {
        normalize_link(&self.link)
    }

    /// Applies a re-sighting of the same posting. The identifier, link,
    /// source and creation time are left untouched.
    pub fn apply_update(&mut self, raw: &RawListing) {
        self.title = raw.title().to_string();
        self.company_name = raw.company_name().to_string();
        self.description = raw.description().to_string();
        self.updated_at = Some(current_timestamp());
    }

    /// Text fed to the embedding model for this listing.
    pub fn embedding_text(&self) -> String {
        format!("{} {} {}", self.title, self.company_name, self.description)
    }

    pub fn summary(&self) -> String {
        if self.company_name.is_empty() {
            self.title.clone()
        } else {
            format!("{} at {}", self.title, self.company_name)
        }
    }
}

/// A record as returned by a job-board scraper, before it has an identifier.
///
/// Field names follow the scraper's row format; `company` and `job_url` are
/// accepted as alternatives to `company_name` and `link`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default, skip_serializing)]
    company: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    job_url: Option<String>,
    #[serde(default, skip_serializing)]
    link: Option<String>,
    #[serde(default, alias = "source")]
    site: Option<String>,
}

impl RawListing {
    pub fn new(
        title: impl Into<String>,
        company_name: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            company_name: Some(company_name.into()),
            description: Some(description.into()),
            job_url: Some(link.into()),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.site = Some(source.into());
        self
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn company_name(&self) -> &str {
        self.company_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.company.as_deref())
            .unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// The application link, if the row carries a non-blank one.
    pub fn link(&self) -> Option<&str> {
        self.job_url
            .as_deref()
            .or(self.link.as_deref())
            .filter(|l| !l.trim().is_empty())
    }

    pub fn source(&self) -> Option<&str> {
        self.site.as_deref()
    }

    pub fn link_key(&self) -> Option<String> {
        self.link().map(normalize_link)
    }
}

pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
