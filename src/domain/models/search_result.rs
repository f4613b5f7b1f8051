use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PointId;

pub const DEFAULT_LIMIT: usize = 5;

/// A nearest-neighbour match as returned by the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    id: PointId,
    #[serde(default)]
    payload: Map<String, Value>,
    score: f32,
}

impl SearchHit {
    pub fn new(id: PointId, payload: Map<String, Value>, score: f32) -> Self {
        Self { id, payload, score }
    }

    pub fn id(&self) -> &PointId {
        &self.id
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Payload string field, `None` when absent or not a string.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.text_field("description")
    }
}

/// Comparison applied to a numeric payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl RangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            RangeOp::Lt => left < right,
            RangeOp::Lte => left <= right,
            RangeOp::Gt => left > right,
            RangeOp::Gte => left >= right,
        }
    }
}

/// Single scalar comparison `field op value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub field: String,
    pub op: RangeOp,
    pub value: f64,
}

impl FieldCondition {
    pub fn new(field: impl Into<String>, op: RangeOp, value: f64) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn matches(&self, payload: &Map<String, Value>) -> bool {
        payload
            .get(&self.field)
            .and_then(Value::as_f64)
            .is_some_and(|actual| self.op.holds(actual, self.value))
    }
}

/// Conjunction of field conditions; every condition must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    must: Vec<FieldCondition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper-bound filter on the `price` payload field (exclusive).
    pub fn max_price(price: f64) -> Self {
        Self::new().and(FieldCondition::new("price", RangeOp::Lt, price))
    }

    pub fn and(mut self, condition: FieldCondition) -> Self {
        self.must.push(condition);
        self
    }

    pub fn conditions(&self) -> &[FieldCondition] {
        &self.must
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
    }

    pub fn matches(&self, payload: &Map<String, Value>) -> bool {
        self.must.iter().all(|condition| condition.matches(payload))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    query: String,
    limit: usize,
    filter: Option<Filter>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            filter: None,
        }
    }

    /// Zero falls back to the default limit instead of erroring.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = if filter.is_empty() { None } else { Some(filter) };
        self
    }

    pub fn with_max_price(self, max_price: Option<f64>) -> Self {
        match max_price {
            Some(price) => self.with_filter(Filter::max_price(price)),
            None => self,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn summary(&self) -> String {
        let mut parts = vec![format!("query=\"{}\"", self.query)];
        parts.push(format!("limit={}", self.limit));
        if let Some(ref filter) = self.filter {
            for condition in filter.conditions() {
                parts.push(format!(
                    "{} {} {}",
                    condition.field,
                    condition.op.as_str(),
                    condition.value
                ));
            }
        }
        parts.join(", ")
    }
}
