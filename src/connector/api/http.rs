//! HTTP retrieval surface: `/search`, `/rag` and `/healthz`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use super::container::Container;
use crate::domain::{DomainError, GroundedAnswer, SearchHit, SearchQuery, DEFAULT_LIMIT};

pub const MISSING_QUERY: &str = "Missing query param `q`";

/// Raw query string; every field is optional so bad values degrade to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RetrievalParams {
    q: Option<String>,
    top: Option<String>,
    #[serde(rename = "maxPrice")]
    max_price: Option<String>,
}

impl RetrievalParams {
    /// Validate and convert into a search query.
    pub fn into_query(self) -> Result<SearchQuery, DomainError> {
        let question = self
            .q
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| DomainError::validation(MISSING_QUERY))?;

        let top = self
            .top
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&top| top > 0)
            .unwrap_or(DEFAULT_LIMIT);

        let max_price = self
            .max_price
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|price| price.is_finite());

        Ok(SearchQuery::new(question)
            .with_limit(top)
            .with_max_price(max_price))
    }
}

pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            DomainError::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            other => {
                warn!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}

pub fn app(container: Arc<Container>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/search", get(search_handler))
        .route("/rag", get(rag_handler))
        .with_state(container)
}

pub async fn serve(container: Arc<Container>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(container))
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn search_handler(
    State(container): State<Arc<Container>>,
    Query(params): Query<RetrievalParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let query = params.into_query()?;
    let hits = container.search_use_case().execute(&query).await?;
    Ok(Json(hits))
}

async fn rag_handler(
    State(container): State<Arc<Container>>,
    Query(params): Query<RetrievalParams>,
) -> Result<Json<GroundedAnswer>, ApiError> {
    let query = params.into_query()?;
    let answer = container.answer_use_case().execute(&query).await?;
    Ok(Json(answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: Option<&str>, top: Option<&str>, max_price: Option<&str>) -> RetrievalParams {
        RetrievalParams {
            q: q.map(str::to_string),
            top: top.map(str::to_string),
            max_price: max_price.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_or_blank_q_is_validation_error() {
        for q in [None, Some(""), Some("   ")] {
            let err = params(q, None, None).into_query().unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), format!("Invalid input: {}", MISSING_QUERY));
        }
    }

    #[test]
    fn test_top_falls_back_to_default() {
        for top in [None, Some("abc"), Some("0"), Some("-3")] {
            let query = params(Some("widget"), top, None).into_query().unwrap();
            assert_eq!(query.limit(), DEFAULT_LIMIT);
        }
        let query = params(Some("widget"), Some("12"), None).into_query().unwrap();
        assert_eq!(query.limit(), 12);
    }

    #[test]
    fn test_max_price_becomes_filter_when_parseable() {
        let query = params(Some("widget"), None, Some("10.5")).into_query().unwrap();
        let filter = query.filter().unwrap();
        assert_eq!(filter.conditions()[0].field, "price");
        assert_eq!(filter.conditions()[0].value, 10.5);

        let query = params(Some("widget"), None, Some("cheap")).into_query().unwrap();
        assert!(query.filter().is_none());

        let query = params(Some("widget"), None, Some("NaN")).into_query().unwrap();
        assert!(query.filter().is_none());
    }
}
