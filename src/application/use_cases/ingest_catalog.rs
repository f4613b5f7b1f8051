use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::application::{EmbeddingService, VectorRepository};
use crate::domain::{
    Distance, DomainError, IndexedPoint, IngestFailure, IngestReport, IngestStage, ProductRecord,
};

/// Embeds and upserts a catalog with a fixed pool of concurrent workers.
///
/// Every record is attempted exactly once. A record that fails to embed is
/// never upserted, and a failure on one record never stops the others.
pub struct IngestCatalogUseCase {
    vector_repo: Arc<dyn VectorRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
    workers: usize,
}

impl IngestCatalogUseCase {
    pub fn new(
        vector_repo: Arc<dyn VectorRepository>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            vector_repo,
            embedding_service,
            workers: default_worker_count(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Create the collection sized for the configured embedding model.
    pub async fn prepare_collection(&self) -> Result<(), DomainError> {
        let dimensions = self.embedding_service.config().dimensions();
        info!(
            "Preparing collection ({} dimensions, {})",
            dimensions,
            Distance::Cosine.as_str()
        );
        self.vector_repo
            .create_collection(dimensions, Distance::Cosine)
            .await
    }

    pub async fn execute(&self, products: Vec<ProductRecord>) -> Result<IngestReport, DomainError> {
        let total = products.len();
        info!(
            "Inserting {} products with {} workers",
            total, self.workers
        );

        let start_time = Instant::now();
        let progress_bar = ProgressBar::new(total as u64);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );

        let (sender, receiver) = mpsc::channel::<ProductRecord>(self.workers);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = JoinSet::new();
        for worker_id in 1..=self.workers {
            let worker = Worker {
                id: worker_id,
                jobs: Arc::clone(&receiver),
                embedding_service: Arc::clone(&self.embedding_service),
                vector_repo: Arc::clone(&self.vector_repo),
                progress: progress_bar.clone(),
            };
            workers.spawn(worker.run());
        }
        // Workers hold the only receiver handles; if they all die, send fails.
        drop(receiver);

        for product in products {
            if sender.send(product).await.is_err() {
                warn!("All ingestion workers exited before the catalog was drained");
                break;
            }
        }
        drop(sender);

        let mut report = IngestReport {
            total,
            ..IngestReport::default()
        };
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => {
                    report.succeeded += outcome.succeeded;
                    report.failures.extend(outcome.failures);
                }
                Err(e) => error!("Ingestion worker terminated abnormally: {}", e),
            }
        }

        progress_bar.finish_with_message("done");

        info!(
            "Ingestion complete: {} in {:.2}s",
            report.summary(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(report)
    }
}

/// Twice the available parallelism, at least one.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 2
}

/// Embed one record and upsert the resulting point.
pub async fn ingest_product(
    embedding_service: &dyn EmbeddingService,
    vector_repo: &dyn VectorRepository,
    product: &ProductRecord,
) -> Result<(), (IngestStage, DomainError)> {
    let vector = embedding_service
        .embed(&product.embedding_input())
        .await
        .map_err(|e| (IngestStage::Embed, e))?;

    let point = IndexedPoint::new(product.point_id(), vector, product.payload());
    vector_repo
        .upsert(&point)
        .await
        .map_err(|e| (IngestStage::Upsert, e))
}

#[derive(Default)]
struct WorkerOutcome {
    succeeded: usize,
    failures: Vec<IngestFailure>,
}

struct Worker {
    id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<ProductRecord>>>,
    embedding_service: Arc<dyn EmbeddingService>,
    vector_repo: Arc<dyn VectorRepository>,
    progress: ProgressBar,
}

impl Worker {
    async fn run(self) -> WorkerOutcome {
        let mut outcome = WorkerOutcome::default();

        loop {
            let next = {
                let mut jobs = self.jobs.lock().await;
                jobs.recv().await
            };
            let Some(product) = next else {
                break;
            };

            self.progress.set_message(product.id.clone());
            match self.ingest_isolated(&product).await {
                Ok(()) => {
                    debug!("[worker {}] Inserted product: {}", self.id, product.id);
                    outcome.succeeded += 1;
                }
                Err((stage, e)) => {
                    warn!(
                        "[worker {}] Failed to {} product {}: {}",
                        self.id, stage, product.id, e
                    );
                    outcome.failures.push(IngestFailure {
                        product_id: product.id.clone(),
                        stage,
                        message: e.to_string(),
                    });
                }
            }
            self.progress.inc(1);
        }

        debug!("[worker {}] Queue drained, exiting", self.id);
        outcome
    }

    /// Run one record on its own task so a panic is charged to that record
    /// and the worker keeps draining the queue.
    async fn ingest_isolated(
        &self,
        product: &ProductRecord,
    ) -> Result<(), (IngestStage, DomainError)> {
        let embedding_service = Arc::clone(&self.embedding_service);
        let vector_repo = Arc::clone(&self.vector_repo);
        let item = product.clone();

        tokio::spawn(async move {
            ingest_product(embedding_service.as_ref(), vector_repo.as_ref(), &item).await
        })
        .await
        .unwrap_or_else(|e| {
            Err((
                IngestStage::Crashed,
                DomainError::internal(format!("ingestion task panicked: {}", e)),
            ))
        })
    }
}
