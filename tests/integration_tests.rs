//! End-to-end tests for the CLI surface with mock models and in-memory storage.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use internmatch::{
    Commands, Container, ContainerConfig, InMemoryListingRepository, JobBoardApiSource,
    OutputFormat, Router,
};
use tempfile::NamedTempFile;

fn mock_container() -> Container {
    Container::with_parts(
        Arc::new(InMemoryListingRepository::new()),
        // Never reached: these tests do not scrape.
        Arc::new(JobBoardApiSource::new("http://127.0.0.1:9")),
        ContainerConfig {
            mock_models: true,
            memory_storage: true,
            ..ContainerConfig::default()
        },
    )
}

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("tempfile");
    file.write_all(content.as_bytes()).expect("write");
    file
}

const EXPORT: &str = r#"{"title":"Backend Intern","company":"Acme","description":"Python, SQL, REST APIs","job_url":"https://jobs.example.com/1","site":"linkedin"}
{"title":"Frontend Intern","company":"Globex","description":"React and TypeScript","job_url":"https://jobs.example.com/2","site":"google"}
{"title":"Data Intern","company":"Initech","description":"Pandas, statistics","job_url":"https://jobs.example.com/3?utm_source=feed","site":"linkedin"}
{"title":"No Link Intern","company":"Hooli","description":"","job_url":null}
"#;

async fn import_export(router: &Router<'_>) -> (NamedTempFile, String) {
    let export = write_file(".jsonl", EXPORT);
    let output = router
        .route(Commands::Import {
            file: export.path().to_path_buf(),
        })
        .await
        .expect("import");
    (export, output)
}

#[tokio::test]
async fn test_import_reports_inserted_and_skipped_rows() {
    let container = mock_container();
    let router = Router::new(&container);

    let (_export, output) = import_export(&router).await;

    assert!(output.contains("Inserted: 3"), "{output}");
    assert!(output.contains("Skipped:  1"), "{output}");

    let (_export, again) = import_export(&router).await;
    assert!(again.contains("Inserted: 0"), "{again}");
    assert!(again.contains("Updated:  3"), "{again}");
}

#[tokio::test]
async fn test_match_with_empty_store_is_neutral() {
    let container = mock_container();
    let router = Router::new(&container);
    let resume = write_file(".txt", "Python developer with SQL experience");

    let output = router
        .route(Commands::Match {
            resume: resume.path().to_path_buf(),
            top_k: None,
            top_n: None,
            format: OutputFormat::Text,
        })
        .await
        .expect("match");

    assert_eq!(output, "No matches found.");
}

#[tokio::test]
async fn test_match_ranks_stored_listings_as_json() {
    let container = mock_container();
    let router = Router::new(&container);
    let (_export, _) = import_export(&router).await;
    let resume = write_file(".txt", "Python developer with SQL experience");

    let output = router
        .route(Commands::Match {
            resume: resume.path().to_path_buf(),
            top_k: Some(3),
            top_n: Some(2),
            format: OutputFormat::Json,
        })
        .await
        .expect("match");

    let matches: Vec<serde_json::Value> = serde_json::from_str(&output).expect("json output");
    assert!(!matches.is_empty());
    assert!(matches.len() <= 2);

    let scores: Vec<u64> = matches
        .iter()
        .map(|m| m["match_score"].as_u64().expect("score"))
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
    for m in &matches {
        let link = m["link"].as_str().expect("link");
        assert!(link.starts_with("https://jobs.example.com/"));
    }
}

#[tokio::test]
async fn test_match_text_output_is_deterministic() {
    let container = mock_container();
    let router = Router::new(&container);
    let (_export, _) = import_export(&router).await;
    let resume = write_file(".md", "# Resume\nReact, TypeScript, CSS");

    let run = || {
        router.route(Commands::Match {
            resume: resume.path().to_path_buf(),
            top_k: None,
            top_n: Some(3),
            format: OutputFormat::Text,
        })
    };
    let first = run().await.expect("first match");
    let second = run().await.expect("second match");

    assert!(first.starts_with("Top "), "{first}");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_list_and_stats_reflect_imported_listings() {
    let container = mock_container();
    let router = Router::new(&container);
    let (_export, _) = import_export(&router).await;

    let list = router
        .route(Commands::List {
            page: 1,
            per_page: 2,
            format: OutputFormat::Text,
        })
        .await
        .expect("list");
    assert!(list.starts_with("Listings (page 1 of 2, 3 total)"), "{list}");

    let stats = router.route(Commands::Stats).await.expect("stats");
    assert!(stats.contains("Listings:   3"), "{stats}");
    assert!(stats.contains("Companies:  3"), "{stats}");
}

#[tokio::test]
async fn test_missing_resume_is_an_error() {
    let container = mock_container();
    let router = Router::new(&container);

    let result = router
        .route(Commands::Match {
            resume: PathBuf::from("/definitely/not/a/resume.txt"),
            top_k: None,
            top_n: None,
            format: OutputFormat::Text,
        })
        .await;

    assert!(result.is_err());
}
