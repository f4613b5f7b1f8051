pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    default_worker_count, AnswerQuestionUseCase, ChatClient, EmbeddingService,
    IngestCatalogUseCase, SearchProductsUseCase, VectorRepository,
};

pub use cli::Commands;

pub use connector::{
    load_products, parse_products, InMemoryVectorRepository, MockEmbedding, OpenAiChatClient,
    OpenAiEmbedding, QdrantVectorRepository, RetryPolicy, RetryingChatClient, RetryingEmbedding,
    DEFAULT_CHAT_MODEL, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_QDRANT_URL,
};

pub use domain::{
    Distance, DomainError, EmbeddingConfig, Filter, GroundedAnswer, GroundedItem, IndexedPoint,
    IngestFailure, IngestReport, IngestStage, PointId, ProductPayload, ProductRecord, SearchHit,
    SearchQuery,
};
