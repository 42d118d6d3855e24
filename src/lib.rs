pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::{Commands, OutputFormat};

pub use application::{
    ChatClient, EmbeddingService, IngestListingsUseCase, ListListingsUseCase, ListingRepository,
    ListingSource, LlmRanker, RankCandidatesUseCase,
};

pub use connector::{
    AnthropicClient, Container, ContainerConfig, DuckdbListingRepository,
    InMemoryListingRepository, JobBoardApiSource, MockChatClient, MockEmbedding, OrtEmbedding,
    Router,
};

pub use domain::{
    normalize_link, DomainError, Embedding, EmbeddingConfig, IngestReport, Listing, ListingPage,
    MatchResult, RankedListing, RankingConfig, RawListing, ShortlistEntry, UpsertOutcome,
};
