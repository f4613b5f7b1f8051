use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::application::{EmbeddingService, VectorRepository};
use crate::domain::{DomainError, SearchHit, SearchQuery};

pub struct SearchProductsUseCase {
    vector_repo: Arc<dyn VectorRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
}

impl SearchProductsUseCase {
    pub fn new(
        vector_repo: Arc<dyn VectorRepository>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            vector_repo,
            embedding_service,
        }
    }

    pub async fn execute(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, DomainError> {
        if query.query().trim().is_empty() {
            return Err(DomainError::validation("query text must not be empty"));
        }

        info!("Searching for: {}", query.summary());
        let start_time = Instant::now();

        let vector = self.embedding_service.embed(query.query()).await?;
        let hits = self.vector_repo.search(&vector, query).await?;

        info!(
            "Found {} hits in {:.2}s",
            hits.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(hits)
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, DomainError> {
        let search_query = SearchQuery::new(query).with_limit(limit);
        self.execute(&search_query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{InMemoryVectorRepository, MockEmbedding};

    #[tokio::test]
    async fn test_blank_query_is_rejected_before_any_remote_call() {
        let use_case = SearchProductsUseCase::new(
            Arc::new(InMemoryVectorRepository::new()),
            Arc::new(MockEmbedding::new()),
        );

        let err = use_case.search("   ", 5).await.unwrap_err();
        assert!(err.is_validation());
    }
}
