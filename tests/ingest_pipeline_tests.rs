//! Ingestion pipeline tests: attempt counts, per-item isolation and idempotent upserts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use productsearch::{
    Distance, DomainError, EmbeddingConfig, EmbeddingService, InMemoryVectorRepository,
    IndexedPoint, IngestCatalogUseCase, IngestStage, MockEmbedding, ProductRecord, SearchHit,
    SearchQuery, VectorRepository,
};

/// Embedding fake that counts calls and tracks peak concurrency. It fails for
/// any product whose name starts with "Broken" and panics on "Explode".
struct CountingEmbedding {
    inner: MockEmbedding,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingEmbedding {
    fn new() -> Self {
        Self {
            inner: MockEmbedding::with_dimensions(8),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingService for CountingEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(2)).await;
        if text.starts_with("Explode") {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("embedding backend blew up");
        }
        let result = if text.starts_with("Broken") {
            Err(DomainError::remote("embedding provider returned 500"))
        } else {
            self.inner.embed(text).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn config(&self) -> &EmbeddingConfig {
        self.inner.config()
    }
}

/// Store fake that counts upserts and rejects products named "Rejected".
struct CountingRepository {
    inner: InMemoryVectorRepository,
    upserts: AtomicUsize,
}

impl CountingRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryVectorRepository::new(),
            upserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorRepository for CountingRepository {
    async fn create_collection(
        &self,
        dimensions: usize,
        distance: Distance,
    ) -> Result<(), DomainError> {
        self.inner.create_collection(dimensions, distance).await
    }

    async fn upsert(&self, point: &IndexedPoint) -> Result<(), DomainError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if point.payload.name == "Rejected" {
            return Err(DomainError::remote("store returned 400"));
        }
        self.inner.upsert(point).await
    }

    async fn search(
        &self,
        vector: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.inner.search(vector, query).await
    }
}

fn product(id: usize, name: &str) -> ProductRecord {
    ProductRecord::new(
        format!("P{}", id),
        name,
        format!("{} number {}", name, id),
        id as f64,
        "USD",
        100,
        1,
    )
}

fn catalog(n: usize) -> Vec<ProductRecord> {
    (1..=n).map(|i| product(i, "Widget")).collect()
}

struct Fixture {
    embedding: Arc<CountingEmbedding>,
    repo: Arc<CountingRepository>,
    use_case: IngestCatalogUseCase,
}

fn fixture(workers: usize) -> Fixture {
    let embedding = Arc::new(CountingEmbedding::new());
    let repo = Arc::new(CountingRepository::new());
    let use_case = IngestCatalogUseCase::new(repo.clone(), embedding.clone()).with_workers(workers);
    Fixture {
        embedding,
        repo,
        use_case,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_record_is_embedded_and_upserted_exactly_once() {
    let f = fixture(4);

    let report = f.use_case.execute(catalog(25)).await.unwrap();

    assert_eq!(f.embedding.calls.load(Ordering::SeqCst), 25);
    assert_eq!(f.repo.upserts.load(Ordering::SeqCst), 25);
    assert_eq!(f.repo.inner.len().await, 25);
    assert_eq!(report.total, 25);
    assert_eq!(report.succeeded, 25);
    assert!(report.is_complete_success());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_never_exceeds_worker_count() {
    let f = fixture(3);

    f.use_case.execute(catalog(30)).await.unwrap();

    let peak = f.embedding.peak.load(Ordering::SeqCst);
    assert!(peak >= 1);
    assert!(peak <= 3, "peak concurrency {} exceeded 3 workers", peak);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_embed_failure_skips_upsert_and_does_not_stop_others() {
    let f = fixture(2);
    let mut products = catalog(5);
    products.insert(2, product(99, "Broken"));

    let report = f.use_case.execute(products).await.unwrap();

    assert_eq!(f.embedding.calls.load(Ordering::SeqCst), 6);
    assert_eq!(f.repo.upserts.load(Ordering::SeqCst), 5);
    assert_eq!(report.succeeded, 5);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].product_id, "P99");
    assert_eq!(report.failures[0].stage, IngestStage::Embed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_upsert_failure_is_recorded_per_item() {
    let f = fixture(2);
    let mut products = catalog(3);
    products.push(product(42, "Rejected"));

    let report = f.use_case.execute(products).await.unwrap();

    assert_eq!(f.embedding.calls.load(Ordering::SeqCst), 4);
    assert_eq!(f.repo.upserts.load(Ordering::SeqCst), 4);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failures_at(IngestStage::Upsert).count(), 1);
    assert!(f.repo.inner.get(&product(42, "Rejected").point_id()).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_record_is_reported_and_others_complete() {
    let f = fixture(2);
    let mut products = catalog(4);
    products.insert(1, product(77, "Explode"));

    let report = f.use_case.execute(products).await.unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(f.repo.inner.len().await, 4);

    let crashed: Vec<_> = report.failures_at(IngestStage::Crashed).collect();
    assert_eq!(crashed.len(), 1);
    assert_eq!(crashed[0].product_id, "P77");
    assert!(crashed[0].message.contains("panicked"));
    assert!(!report.is_complete_success());
}

#[tokio::test]
async fn test_more_workers_than_records() {
    let f = fixture(16);

    let report = f.use_case.execute(catalog(2)).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(f.embedding.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_reingesting_same_id_keeps_latest_payload() {
    let f = fixture(1);
    let original = ProductRecord::new("P1", "Widget", "A small widget", 9.99, "USD", 100, 5);
    let mut updated = original.clone();
    updated.price = 4.5;

    f.use_case.execute(vec![original.clone()]).await.unwrap();
    f.use_case.execute(vec![updated]).await.unwrap();

    assert_eq!(f.repo.inner.len().await, 1);
    let stored = f.repo.inner.get(&original.point_id()).await.unwrap();
    assert_eq!(stored.payload.price, 4.5);
}

#[tokio::test]
async fn test_prepare_collection_uses_embedding_dimensions() {
    let f = fixture(1);
    f.use_case.prepare_collection().await.unwrap();

    let record = product(1, "Widget");
    let wrong = IndexedPoint::new(record.point_id(), vec![1.0; 3], record.payload());
    let err = f.repo.upsert(&wrong).await.unwrap_err();
    assert!(err.is_configuration());
}
