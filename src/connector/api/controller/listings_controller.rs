use anyhow::Result;

use crate::cli::OutputFormat;
use crate::domain::{Listing, ListingPage};

use super::super::Container;

pub struct ListingsController<'a> {
    container: &'a Container,
}

impl<'a> ListingsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self, page: usize, per_page: usize, format: OutputFormat) -> Result<String> {
        let listing_page = self.container.list_use_case().page(page, per_page).await?;

        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(&listing_page)?,
            OutputFormat::Text => format_page(&listing_page),
        })
    }
}

fn format_listing(number: usize, listing: &Listing) -> String {
    let mut out = format!("{}. {}\n", number, listing.summary());
    if let Some(source) = listing.source() {
        out.push_str(&format!("   Source: {}\n", source));
    }
    out.push_str(&format!("   Apply:  {}\n", listing.link()));
    out
}

fn format_page(page: &ListingPage) -> String {
    if page.is_empty() {
        return "No listings stored. Run `internmatch scrape` or `internmatch import` first."
            .to_string();
    }

    let mut output = format!(
        "Listings (page {} of {}, {} total):\n\n",
        page.page(),
        page.total_pages(),
        page.total()
    );
    let offset = (page.page() - 1) * page.per_page();
    for (i, listing) in page.items().iter().enumerate() {
        output.push_str(&format_listing(offset + i + 1, listing));
        output.push('\n');
    }
    output
}
