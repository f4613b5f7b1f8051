use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::VectorRepository;
use crate::domain::{Distance, DomainError, IndexedPoint, PointId, SearchHit, SearchQuery};

/// Process-local vector store with the same upsert and filter semantics as Qdrant.
pub struct InMemoryVectorRepository {
    points: Arc<Mutex<HashMap<PointId, IndexedPoint>>>,
    dimensions: Arc<Mutex<Option<usize>>>,
}

impl InMemoryVectorRepository {
    pub fn new() -> Self {
        Self {
            points: Arc::new(Mutex::new(HashMap::new())),
            dimensions: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn get(&self, id: &PointId) -> Option<IndexedPoint> {
        self.points.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.points.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.lock().await.is_empty()
    }
}

impl Default for InMemoryVectorRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorRepository for InMemoryVectorRepository {
    async fn create_collection(
        &self,
        dimensions: usize,
        distance: Distance,
    ) -> Result<(), DomainError> {
        let mut current = self.dimensions.lock().await;
        if current.is_some() {
            debug!("In-memory collection already exists");
            return Ok(());
        }
        *current = Some(dimensions);
        debug!(
            "Created in-memory collection ({} dimensions, {})",
            dimensions,
            distance.as_str()
        );
        Ok(())
    }

    async fn upsert(&self, point: &IndexedPoint) -> Result<(), DomainError> {
        if let Some(expected) = *self.dimensions.lock().await {
            if point.dimensions() != expected {
                return Err(DomainError::configuration(format!(
                    "vector dimension mismatch for point {}: expected {}, got {}",
                    point.id,
                    expected,
                    point.dimensions()
                )));
            }
        }

        let mut points = self.points.lock().await;
        points.insert(point.id.clone(), point.clone());
        debug!("Upserted point {} ({} stored)", point.id, points.len());
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let points = self.points.lock().await;

        let mut scored: Vec<(f32, &IndexedPoint, Map<String, Value>)> = Vec::new();
        for point in points.values() {
            let payload = payload_map(point)?;
            if let Some(filter) = query.filter() {
                if !filter.matches(&payload) {
                    continue;
                }
            }
            let score = cosine_similarity(vector, &point.vector);
            scored.push((score, point, payload));
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(query.limit())
            .map(|(score, point, payload)| SearchHit::new(point.id.clone(), payload, score))
            .collect())
    }
}

fn payload_map(point: &IndexedPoint) -> Result<Map<String, Value>, DomainError> {
    match serde_json::to_value(&point.payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DomainError::internal("payload did not serialize to an object")),
        Err(e) => Err(DomainError::internal(format!(
            "failed to serialize payload: {}",
            e
        ))),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductRecord;

    fn unit_vector(dim: usize, hot_index: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[hot_index] = 1.0;
        v
    }

    fn point(record: &ProductRecord, vector: Vec<f32>) -> IndexedPoint {
        IndexedPoint::new(record.point_id(), vector, record.payload())
    }

    #[tokio::test]
    async fn test_upsert_same_id_keeps_latest_payload() {
        let repo = InMemoryVectorRepository::new();
        let first = ProductRecord::new("P1", "Widget", "A small widget", 9.99, "USD", 100, 5);
        let mut second = first.clone();
        second.price = 7.5;
        second.description = "A cheaper widget".to_string();

        repo.upsert(&point(&first, unit_vector(4, 0))).await.unwrap();
        repo.upsert(&point(&second, unit_vector(4, 1))).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let stored = repo.get(&first.point_id()).await.unwrap();
        assert_eq!(stored.payload.price, 7.5);
        assert_eq!(stored.payload.description, "A cheaper widget");
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_and_limits() {
        let repo = InMemoryVectorRepository::new();
        let a = ProductRecord::new("1", "A", "first", 1.0, "USD", 1, 1);
        let b = ProductRecord::new("2", "B", "second", 2.0, "USD", 1, 1);
        let c = ProductRecord::new("3", "C", "third", 3.0, "USD", 1, 1);
        repo.upsert(&point(&a, vec![1.0, 0.0, 0.0])).await.unwrap();
        repo.upsert(&point(&b, vec![0.7, 0.7, 0.0])).await.unwrap();
        repo.upsert(&point(&c, vec![0.0, 0.0, 1.0])).await.unwrap();

        let query = SearchQuery::new("q").with_limit(2);
        let hits = repo.search(&[1.0, 0.0, 0.0], &query).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id(), &PointId::Num(1));
        assert_eq!(hits[1].id(), &PointId::Num(2));
        assert!(hits[0].score() > 0.99);
    }

    #[tokio::test]
    async fn test_search_applies_max_price_filter() {
        let repo = InMemoryVectorRepository::new();
        let cheap = ProductRecord::new("1", "Cheap", "cheap one", 5.0, "USD", 1, 1);
        let pricey = ProductRecord::new("2", "Pricey", "pricey one", 50.0, "USD", 1, 1);
        repo.upsert(&point(&cheap, unit_vector(2, 1))).await.unwrap();
        repo.upsert(&point(&pricey, unit_vector(2, 0))).await.unwrap();

        let query = SearchQuery::new("q").with_max_price(Some(10.0));
        let hits = repo.search(&unit_vector(2, 0), &query).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), Some("Cheap"));
    }

    #[tokio::test]
    async fn test_create_collection_is_idempotent_and_enforces_dimensions() {
        let repo = InMemoryVectorRepository::new();
        repo.create_collection(3, Distance::Cosine).await.unwrap();
        repo.create_collection(3, Distance::Cosine).await.unwrap();

        let record = ProductRecord::new("1", "A", "a", 1.0, "USD", 1, 1);
        let err = repo
            .upsert(&point(&record, vec![1.0, 0.0]))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(repo.is_empty().await);
    }
}
