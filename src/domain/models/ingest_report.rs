use serde::{Deserialize, Serialize};

/// Whether an upsert created a new listing or refreshed an existing one.
/// Either way it carries the listing's (stable) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    Inserted(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => id,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }
}

/// Tally of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub inserted: u64,
    pub updated: u64,
    /// Rows without a usable link.
    pub skipped: u64,
    /// Search terms whose fetch failed.
    pub failed_terms: Vec<String>,
}

impl IngestReport {
    pub fn record(&mut self, outcome: &UpsertOutcome) {
        if outcome.is_inserted() {
            self.inserted += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn total_written(&self) -> u64 {
        self.inserted + self.updated
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} inserted, {} updated, {} skipped",
            self.inserted, self.updated, self.skipped
        );
        if !self.failed_terms.is_empty() {
            summary.push_str(&format!(", failed terms: {}", self.failed_terms.join(", ")));
        }
        summary
    }
}
