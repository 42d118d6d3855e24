use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    ChatClient, EmbeddingService, IngestListingsUseCase, ListListingsUseCase, ListingRepository,
    ListingSource, RankCandidatesUseCase,
};
use crate::connector::adapter::{
    read_listing_snapshot, AnthropicClient, DuckdbListingRepository, InMemoryListingRepository,
    JobBoardApiSource, MockChatClient, MockEmbedding, OrtEmbedding,
};
use crate::domain::RankingConfig;

pub const DATABASE_FILE: &str = "internmatch.duckdb";

pub struct ContainerConfig {
    pub data_dir: String,
    /// Deterministic offline embedding and reasoning models.
    pub mock_models: bool,
    pub memory_storage: bool,
    /// Snapshot used to seed in-memory storage. Implies `memory_storage`.
    pub listings_file: Option<PathBuf>,
    pub ranking: RankingConfig,
    pub show_progress: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            mock_models: false,
            memory_storage: false,
            listings_file: None,
            ranking: RankingConfig::default(),
            show_progress: false,
        }
    }
}

/// Wires adapters to use cases.
///
/// Storage is opened eagerly. Models are created on demand, since only
/// `match` needs them and the ONNX model may have to be downloaded first.
pub struct Container {
    listing_repo: Arc<dyn ListingRepository>,
    source: Arc<dyn ListingSource>,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let listing_repo: Arc<dyn ListingRepository> =
            if config.memory_storage || config.listings_file.is_some() {
                let seed = match config.listings_file.as_deref() {
                    Some(path) => {
                        debug!("Seeding in-memory listings from {}", path.display());
                        read_listing_snapshot(path)?
                    }
                    None => Vec::new(),
                };
                debug!("Using in-memory listing storage ({} seeded)", seed.len());
                Arc::new(InMemoryListingRepository::from_listings(seed))
            } else {
                let db_path = PathBuf::from(&config.data_dir).join(DATABASE_FILE);
                debug!("Using DuckDB listing storage at {:?}", db_path);
                Arc::new(DuckdbListingRepository::new(&db_path)?)
            };

        let source: Arc<dyn ListingSource> = Arc::new(JobBoardApiSource::from_env());

        Ok(Self {
            listing_repo,
            source,
            config,
        })
    }

    /// Builds a container around explicit collaborators.
    pub fn with_parts(
        listing_repo: Arc<dyn ListingRepository>,
        source: Arc<dyn ListingSource>,
        config: ContainerConfig,
    ) -> Self {
        Self {
            listing_repo,
            source,
            config,
        }
    }

    pub fn embedding_service(&self) -> Result<Arc<dyn EmbeddingService>> {
        if self.config.mock_models {
            debug!("Using mock embedding service");
            Ok(Arc::new(MockEmbedding::new()))
        } else {
            debug!("Initializing ONNX embedding service...");
            Ok(Arc::new(OrtEmbedding::new(None)?))
        }
    }

    pub fn chat_client(&self) -> Arc<dyn ChatClient> {
        if self.config.mock_models {
            debug!("Using mock reasoning model");
            Arc::new(MockChatClient::new())
        } else {
            let client = AnthropicClient::from_env();
            debug!("Using reasoning model at {}", client.endpoint());
            Arc::new(client)
        }
    }

    pub fn rank_use_case(&self, ranking: RankingConfig) -> Result<RankCandidatesUseCase> {
        Ok(RankCandidatesUseCase::new(
            self.embedding_service()?,
            self.chat_client(),
            ranking,
        ))
    }

    pub fn list_use_case(&self) -> ListListingsUseCase {
        ListListingsUseCase::new(self.listing_repo.clone())
    }

    pub fn ingest_use_case(&self) -> IngestListingsUseCase {
        IngestListingsUseCase::new(self.listing_repo.clone())
            .with_source(self.source.clone())
            .with_progress(self.config.show_progress)
    }

    pub fn ranking_config(&self) -> &RankingConfig {
        &self.config.ranking
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn storage_kind(&self) -> &'static str {
        if self.config.memory_storage || self.config.listings_file.is_some() {
            "in-memory"
        } else {
            "duckdb"
        }
    }

    pub fn mock_models(&self) -> bool {
        self.config.mock_models
    }
}
