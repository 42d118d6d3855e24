use std::borrow::Cow;

use crate::domain::{Listing, RankingConfig};

/// System prompt pinning the response format.
pub const SYSTEM_PROMPT: &str = "\
You are an evaluator scoring how well a resume fits internship postings. \
You respond with a JSON array only: no prose, no markdown.";

const TRUNCATION_MARKER: &str = " [...]";

/// The rendered prompt for one ranking call, plus the listing identifiers it
/// actually contains. Those identifiers are the only ones a model response
/// may legitimately reference.
#[derive(Debug, Clone)]
pub struct ShortlistPrompt {
    system: String,
    user: String,
    listing_ids: Vec<String>,
}

impl ShortlistPrompt {
    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn listing_ids(&self) -> &[String] {
        &self.listing_ids
    }

    pub fn is_empty(&self) -> bool {
        self.listing_ids.is_empty()
    }
}

/// Renders a shortlist and a resume into a bounded prompt.
///
/// Limits, all in characters:
/// - each description is cut to `max_description_chars`;
/// - the resume is cut to `max_resume_chars`;
/// - listing blocks are appended in shortlist order until the next block would
///   push the prompt past `max_prompt_chars`, and the rest are left out.
///
/// Truncated text ends with `" [...]"`.
#[derive(Debug, Clone)]
pub struct ShortlistPromptBuilder {
    max_description_chars: usize,
    max_resume_chars: usize,
    max_prompt_chars: usize,
    top_n: usize,
}

impl ShortlistPromptBuilder {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            max_description_chars: config.max_description_chars(),
            max_resume_chars: config.max_resume_chars(),
            max_prompt_chars: config.max_prompt_chars(),
            top_n: config.top_n_result(),
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn build(&self, resume: &str, shortlist: &[&Listing]) -> ShortlistPrompt {
        let resume = truncate_chars(resume.trim(), self.max_resume_chars);

        let header = format!(
            "Given the resume and internship list below, return the TOP {} matches \
             with a crisp, honest reason and a strict match score.\n\n\
             Resume:\n{}\n\nInternships:\n",
            self.top_n.max(1),
            resume
        );
        let footer = output_contract();

        let mut budget = self
            .max_prompt_chars
            .saturating_sub(header.chars().count() + footer.chars().count());

        let mut blocks = String::new();
        let mut listing_ids = Vec::with_capacity(shortlist.len());

        for listing in shortlist {
            let block = self.render_listing(listing);
            let len = block.chars().count();
            if len > budget {
                break;
            }
            budget -= len;
            blocks.push_str(&block);
            listing_ids.push(listing.id().to_string());
        }

        ShortlistPrompt {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("{header}{blocks}{footer}"),
            listing_ids,
        }
    }

    fn render_listing(&self, listing: &Listing) -> String {
        format!(
            "Job ID: {}\nTitle: {}\nCompany: {}\nDescription: {}\nLink: {}\n\n",
            listing.id(),
            or_na(listing.title()),
            or_na(listing.company_name()),
            or_na(&truncate_chars(listing.description(), self.max_description_chars)),
            or_na(listing.link()),
        )
    }
}

fn output_contract() -> &'static str {
    "Respond ONLY with a JSON array in this format:\n\
     [\n  {\n    \"job_id\": \"<Job ID copied exactly from the list above>\",\n    \
     \"match_score\": <integer from 0 to 100>,\n    \
     \"reason\": \"<one or two sentences on why this job fits the resume>\"\n  }\n]\n"
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Cuts `text` to at most `max` characters (on a char boundary), appending a
/// marker when anything was removed.
pub fn truncate_chars(text: &str, max: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max) {
        None => Cow::Borrowed(text),
        Some((byte_idx, _)) => Cow::Owned(format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawListing;

    fn listing(title: &str, description: &str) -> Listing {
        Listing::from_raw(&RawListing::new(
            title,
            "Acme",
            description,
            format!("https://jobs.example.com/{title}"),
        ))
    }

    #[test]
    fn test_prompt_contains_resume_listings_and_contract() {
        let a = listing("backend", "Python services");
        let b = listing("frontend", "");
        let builder = ShortlistPromptBuilder::new(&RankingConfig::default());

        let prompt = builder.build("Rust and Python developer", &[&a, &b]);

        assert!(prompt.user().contains("Rust and Python developer"));
        assert!(prompt.user().contains(&format!("Job ID: {}", a.id())));
        assert!(prompt.user().contains("Title: backend"));
        assert!(prompt.user().contains("Company: Acme"));
        assert!(prompt.user().contains("Description: N/A"));
        assert!(prompt.user().contains("\"match_score\""));
        assert!(prompt.user().contains("TOP 5"));
        assert!(prompt.system().contains("evaluator"));
        assert_eq!(prompt.listing_ids(), &[a.id().to_string(), b.id().to_string()]);
    }

    #[test]
    fn test_descriptions_are_truncated() {
        let long = "x".repeat(5_000);
        let a = listing("long", &long);
        let config = RankingConfig::default().with_max_description_chars(100);
        let prompt = ShortlistPromptBuilder::new(&config).build("resume", &[&a]);

        assert!(!prompt.user().contains(&long));
        assert!(prompt.user().contains(&format!("{}{}", "x".repeat(100), TRUNCATION_MARKER)));
    }

    #[test]
    fn test_prompt_budget_drops_trailing_listings() {
        let shortlist: Vec<Listing> = (0..20)
            .map(|i| listing(&format!("job{i}"), &"d".repeat(200)))
            .collect();
        let refs: Vec<&Listing> = shortlist.iter().collect();
        let config = RankingConfig::default().with_max_prompt_chars(2_000);

        let prompt = ShortlistPromptBuilder::new(&config).build("resume", &refs);

        assert!(prompt.user().chars().count() <= 2_000);
        assert!(!prompt.is_empty());
        assert!(prompt.listing_ids().len() < 20);
        assert_eq!(prompt.listing_ids()[0], shortlist[0].id());
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo", 2), format!("hé{TRUNCATION_MARKER}"));
        assert_eq!(truncate_chars("", 0), "");
    }
}
