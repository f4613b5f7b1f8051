use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::{
    default_worker_count, AnswerQuestionUseCase, ChatClient, DomainError, EmbeddingService,
    InMemoryVectorRepository, IngestCatalogUseCase, MockEmbedding, OpenAiChatClient,
    OpenAiEmbedding, QdrantVectorRepository, RetryPolicy, RetryingChatClient, RetryingEmbedding,
    SearchProductsUseCase, VectorRepository, DEFAULT_CHAT_MODEL, DEFAULT_COLLECTION,
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_QDRANT_URL,
};

pub struct ContainerConfig {
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chat_model: String,
    /// Upper bound on every remote call.
    pub timeout_secs: u64,
    /// Attempts per remote call; 1 disables retries.
    pub max_retries: usize,
    /// Ingestion workers; `None` uses twice the available parallelism.
    pub workers: Option<usize>,
    pub mock_embeddings: bool,
    pub memory_storage: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout_secs: 30,
            max_retries: 1,
            workers: None,
            mock_embeddings: false,
            memory_storage: false,
        }
    }
}

impl ContainerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count).max(1)
    }
}

pub struct Container {
    embedding_service: Arc<dyn EmbeddingService>,
    vector_repo: Arc<dyn VectorRepository>,
    chat_client: Arc<dyn ChatClient>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let timeout = config.timeout();
        let retry_policy = RetryPolicy::new(config.max_retries);

        let embedding_service: Arc<dyn EmbeddingService> = if config.mock_embeddings {
            debug!("Using mock embedding service");
            Arc::new(MockEmbedding::with_dimensions(config.embedding_dimensions))
        } else {
            debug!(
                "Using OpenAI embeddings ({}, {} dimensions)",
                config.embedding_model, config.embedding_dimensions
            );
            let openai: Arc<dyn EmbeddingService> = Arc::new(OpenAiEmbedding::new(
                config.openai_api_key.clone(),
                &config.openai_base_url,
                &config.embedding_model,
                config.embedding_dimensions,
                timeout,
            )?);
            Arc::new(RetryingEmbedding::new(openai, retry_policy))
        };

        let vector_repo: Arc<dyn VectorRepository> = if config.memory_storage {
            debug!("Using in-memory vector storage");
            Arc::new(InMemoryVectorRepository::new())
        } else {
            debug!(
                "Using Qdrant at {} collection {}",
                config.qdrant_url, config.collection
            );
            Arc::new(QdrantVectorRepository::new(
                &config.qdrant_url,
                &config.collection,
                config.qdrant_api_key.clone(),
                timeout,
            )?)
        };

        let openai_chat: Arc<dyn ChatClient> = Arc::new(OpenAiChatClient::new(
            config.openai_api_key.clone(),
            &config.openai_base_url,
            &config.chat_model,
            timeout,
        )?);
        let chat_client: Arc<dyn ChatClient> =
            Arc::new(RetryingChatClient::new(openai_chat, retry_policy));

        Ok(Self {
            embedding_service,
            vector_repo,
            chat_client,
            config,
        })
    }

    /// Assemble a container from already-built services.
    pub fn from_parts(
        config: ContainerConfig,
        embedding_service: Arc<dyn EmbeddingService>,
        vector_repo: Arc<dyn VectorRepository>,
        chat_client: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            embedding_service,
            vector_repo,
            chat_client,
            config,
        }
    }

    /// Ingestion cannot run without embedding credentials.
    pub fn require_credentials(&self) -> Result<(), DomainError> {
        let has_key = self
            .config
            .openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if self.config.mock_embeddings || has_key {
            Ok(())
        } else {
            Err(DomainError::configuration(
                "OPENAI_API_KEY is not set (or pass --mock-embeddings)",
            ))
        }
    }

    pub fn ingest_use_case(&self) -> IngestCatalogUseCase {
        IngestCatalogUseCase::new(self.vector_repo.clone(), self.embedding_service.clone())
            .with_workers(self.config.workers())
    }

    pub fn search_use_case(&self) -> SearchProductsUseCase {
        SearchProductsUseCase::new(self.vector_repo.clone(), self.embedding_service.clone())
    }

    pub fn answer_use_case(&self) -> AnswerQuestionUseCase {
        AnswerQuestionUseCase::new(self.search_use_case(), self.chat_client.clone())
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }
}
