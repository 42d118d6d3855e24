use serde::{Deserialize, Serialize};

use super::Listing;

/// A listing kept by the similarity filter, with its cosine score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    listing_id: String,
    score: f32,
}

impl ShortlistEntry {
    pub fn new(listing_id: impl Into<String>, score: f32) -> Self {
        Self {
            listing_id: listing_id.into(),
            score,
        }
    }

    pub fn listing_id(&self) -> &str {
        &self.listing_id
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}

/// A validated verdict from the reasoning model for one shortlisted listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    listing_id: String,
    score: u8,
    reason: String,
}

impl MatchResult {
    /// Scores above 100 are clamped; the parser rejects them before this point.
    pub fn new(listing_id: impl Into<String>, score: u8, reason: impl Into<String>) -> Self {
        Self {
            listing_id: listing_id.into(),
            score: score.min(100),
            reason: reason.into(),
        }
    }

    pub fn listing_id(&self) -> &str {
        &self.listing_id
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A match result joined with the full listing, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedListing {
    listing: Listing,
    score: u8,
    reason: String,
}

impl RankedListing {
    pub fn new(listing: Listing, result: MatchResult) -> Self {
        Self {
            listing,
            score: result.score,
            reason: result.reason,
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn id(&self) -> &str {
        self.listing.id()
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn display_line(&self) -> String {
        format!("{} (match: {}%)", self.listing.summary(), self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawListing;

    #[test]
    fn test_match_result_clamps_score() {
        let result = MatchResult::new("a", 250, "over");
        assert_eq!(result.score(), 100);
    }

    #[test]
    fn test_ranked_listing_joins_fields() {
        let listing = Listing::from_raw(&RawListing::new(
            "Backend Intern",
            "Acme",
            "Rust",
            "https://a.b/1",
        ));
        let result = MatchResult::new(listing.id(), 88, "good fit");
        let ranked = RankedListing::new(listing.clone(), result);

        assert_eq!(ranked.id(), listing.id());
        assert_eq!(ranked.score(), 88);
        assert_eq!(ranked.reason(), "good fit");
        assert_eq!(ranked.display_line(), "Backend Intern at Acme (match: 88%)");
    }
}
