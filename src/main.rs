use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use internmatch::{Commands, Container, ContainerConfig, RankingConfig, Router};

#[derive(Parser)]
#[command(name = "internmatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.internmatch")]
    data_dir: String,

    /// Use deterministic offline models instead of ONNX and the Messages API
    #[arg(long, global = true)]
    mock_models: bool,

    #[arg(long, global = true)]
    memory_storage: bool,

    /// Seed in-memory storage from a JSON snapshot of stored listings
    #[arg(long, global = true)]
    listings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    let data_dir = expand_tilde(&cli.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let show_progress = matches!(cli.command, Commands::Scrape { .. } | Commands::Import { .. });
    let container = Container::new(ContainerConfig {
        data_dir,
        mock_models: cli.mock_models,
        memory_storage: cli.memory_storage,
        listings_file: cli.listings_file,
        ranking: RankingConfig::default(),
        show_progress,
    })
    .await?;

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use internmatch::OutputFormat;

    #[test]
    fn match_accepts_overrides_and_format() {
        let cli = Cli::try_parse_from([
            "internmatch",
            "--mock-models",
            "match",
            "resume.pdf",
            "--top-k",
            "10",
            "--top-n",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(cli.mock_models);
        match cli.command {
            Commands::Match {
                resume,
                top_k,
                top_n,
                format,
            } => {
                assert_eq!(resume, PathBuf::from("resume.pdf"));
                assert_eq!(top_k, Some(10));
                assert_eq!(top_n, Some(3));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn scrape_collects_repeated_terms() {
        let cli = Cli::try_parse_from([
            "internmatch",
            "scrape",
            "--term",
            "rust intern",
            "--term",
            "data intern",
        ])
        .unwrap();

        match cli.command {
            Commands::Scrape { terms } => assert_eq!(terms, vec!["rust intern", "data intern"]),
            _ => panic!("expected scrape command"),
        }
    }

    #[test]
    fn list_defaults_to_first_page_of_thirty() {
        let cli = Cli::try_parse_from(["internmatch", "list"]).unwrap();
        match cli.command {
            Commands::List { page, per_page, .. } => {
                assert_eq!(page, 1);
                assert_eq!(per_page, 30);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let res = Cli::try_parse_from(["internmatch", "match", "cv.txt", "--format", "yaml"]);
        assert!(res.is_err());
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/tmp/data"), "/tmp/data");
    }
}
