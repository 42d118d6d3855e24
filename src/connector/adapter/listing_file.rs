//! Offline listing files: scraper exports to import, and store snapshots to
//! seed the in-memory repository.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{DomainError, Listing, RawListing};

/// Reads scraper rows from a JSON array or a JSON Lines file.
pub fn read_raw_listings(path: &Path) -> Result<Vec<RawListing>, DomainError> {
    let content = std::fs::read_to_string(path)?;
    parse_raw_listings(&content)
        .map_err(|e| DomainError::parse(format!("{}: {}", path.display(), e)))
}

fn parse_raw_listings(content: &str) -> Result<Vec<RawListing>, serde_json::Error> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    created_at: Value,
    #[serde(default)]
    updated_at: Value,
}

/// Reads a store snapshot (a JSON array of stored listings).
///
/// Rows without a link are skipped. A missing id gets a fresh one. Creation
/// and update times may be epoch seconds, RFC 3339 strings, or absent;
/// anything else is treated as absent.
pub fn read_listing_snapshot(path: &Path) -> Result<Vec<Listing>, DomainError> {
    let content = std::fs::read_to_string(path)?;
    let rows: Vec<SnapshotRow> = serde_json::from_str(&content)
        .map_err(|e| DomainError::parse(format!("{}: {}", path.display(), e)))?;

    let total = rows.len();
    let listings: Vec<Listing> = rows.into_iter().filter_map(snapshot_listing).collect();
    debug!(
        "Loaded {} of {} snapshot rows from {}",
        listings.len(),
        total,
        path.display()
    );
    Ok(listings)
}

fn snapshot_listing(row: SnapshotRow) -> Option<Listing> {
    let link = row
        .link
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    let Some(link) = link else {
        warn!("Skipping snapshot row without link: {:?}", row.title);
        return None;
    };

    Some(Listing::reconstitute(
        row.id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        row.title.unwrap_or_default(),
        row.company_name.unwrap_or_default(),
        row.description.unwrap_or_default(),
        link,
        row.source,
        parse_timestamp(&row.created_at),
        parse_timestamp(&row.updated_at),
    ))
}

/// Epoch seconds from an integer, a numeric string, an RFC 3339 string or a
/// plain `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(secs) = s.parse::<i64>() {
                return Some(secs);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp());
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.and_utc().timestamp())
        }
        _ => None,
    }
}
