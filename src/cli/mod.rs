use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank stored listings against a resume (.pdf or text)
    Match {
        resume: PathBuf,

        /// Listings kept by the embedding shortlist
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Listings returned after re-ranking
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Browse stored listings, newest first
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "30")]
        per_page: usize,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Fetch fresh postings from the scraper service
    Scrape {
        /// Search term; repeat for several. Defaults to the built-in internship terms.
        #[arg(short, long = "term")]
        terms: Vec<String>,
    },

    /// Upsert postings from a JSON or JSON Lines export
    Import { file: PathBuf },

    Stats,
}
