use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::application::VectorRepository;
use crate::domain::{Distance, DomainError, Filter, IndexedPoint, SearchHit, SearchQuery};

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";
pub const DEFAULT_COLLECTION: &str = "products";

/// Qdrant REST client bound to a single collection.
pub struct QdrantVectorRepository {
    client: Client,
    base_url: String,
    collection: String,
}

impl QdrantVectorRepository {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let base_url: String = base_url.into();
        let collection: String = collection.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DomainError::configuration(format!(
                "Qdrant URL must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if collection.trim().is_empty() {
            return Err(DomainError::configuration("missing Qdrant collection name"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| DomainError::configuration(format!("invalid Qdrant API key: {}", e)))?;
            headers.insert("api-key", value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("failed to build Qdrant HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Upserts block until the point is indexed.
    fn upsert_url(&self) -> String {
        format!("{}/points?wait=true", self.collection_url())
    }

    async fn read_error(response: reqwest::Response, action: &str) -> DomainError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        DomainError::remote(format!("Qdrant {} failed ({}): {}", action, status, body))
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    with_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

/// Translate a filter into Qdrant's `must` clause shape.
pub fn to_qdrant_filter(filter: &Filter) -> Value {
    let must: Vec<Value> = filter
        .conditions()
        .iter()
        .map(|condition| {
            let mut range = Map::new();
            range.insert(condition.op.as_str().to_string(), json!(condition.value));
            json!({ "key": condition.field, "range": range })
        })
        .collect();
    json!({ "must": must })
}

fn upsert_body(point: &IndexedPoint) -> Value {
    json!({ "points": [point] })
}

fn is_already_exists(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT || body.contains("already exists")
}

#[async_trait]
impl VectorRepository for QdrantVectorRepository {
    async fn create_collection(
        &self,
        dimensions: usize,
        distance: Distance,
    ) -> Result<(), DomainError> {
        let body = json!({
            "vectors": { "size": dimensions, "distance": distance.as_str() }
        });

        let response = self
            .client
            .put(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::remote(format!("Qdrant create collection request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            debug!("Created Qdrant collection {}", self.collection);
            return Ok(());
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        if is_already_exists(status, &text) {
            warn!("Collection {} already exists, reusing it", self.collection);
            return Ok(());
        }

        Err(DomainError::remote(format!(
            "Qdrant create collection failed ({}): {}",
            status, text
        )))
    }

    async fn upsert(&self, point: &IndexedPoint) -> Result<(), DomainError> {
        let url = self.upsert_url();
        let body = upsert_body(point);

        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::remote(format!("Qdrant upsert request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response, "upsert").await);
        }

        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let url = format!("{}/points/search", self.collection_url());
        let request = SearchRequest {
            vector,
            limit: query.limit(),
            with_payload: true,
            with_vector: false,
            filter: query.filter().map(to_qdrant_filter),
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::remote(format!("Qdrant search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response, "search").await);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| DomainError::parse(format!("failed to parse Qdrant search response: {}", e)))?;

        Ok(parsed.result)
    }
}
