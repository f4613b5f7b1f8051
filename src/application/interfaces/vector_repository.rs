use async_trait::async_trait;

use crate::domain::{Distance, DomainError, IndexedPoint, SearchHit, SearchQuery};

/// Vector storage and similarity search operations.
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Create the backing collection. An already existing collection is not an error.
    async fn create_collection(
        &self,
        dimensions: usize,
        distance: Distance,
    ) -> Result<(), DomainError>;

    /// Insert or overwrite the point with the same id.
    async fn upsert(&self, point: &IndexedPoint) -> Result<(), DomainError>;

    /// Nearest neighbours of `vector`, best first, at most `query.limit()` hits.
    async fn search(
        &self,
        vector: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, DomainError>;
}
