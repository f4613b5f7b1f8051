use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PointId, SearchHit};

/// Fields a grounded item is allowed to expose.
pub const OUTPUT_FIELDS: [&str; 6] = [
    "name",
    "description",
    "minimum_order",
    "price",
    "price_currency",
    "supply_ability",
];

/// A search hit that survived grounding, reduced to the output field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedItem {
    pub id: PointId,
    pub payload: Map<String, Value>,
}

impl GroundedItem {
    /// Builds the item from the store's copy of the payload, never the model's.
    pub fn from_hit(hit: &SearchHit) -> Self {
        let payload = OUTPUT_FIELDS
            .iter()
            .map(|field| {
                let value = hit.payload().get(*field).cloned().unwrap_or(Value::Null);
                (field.to_string(), value)
            })
            .collect();
        Self {
            id: hit.id().clone(),
            payload,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.payload.get("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.payload.get("description").and_then(Value::as_str)
    }
}

/// Response of the retrieval-augmented pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub question: String,
    pub total: usize,
    pub answer: Vec<GroundedItem>,
}

impl GroundedAnswer {
    pub fn new(question: impl Into<String>, answer: Vec<GroundedItem>) -> Self {
        Self {
            question: question.into(),
            total: answer.len(),
            answer,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_hit_keeps_only_output_fields() {
        let hit = SearchHit::new(
            PointId::Num(3),
            json!({
                "name": "Widget",
                "description": "A small widget",
                "price": 9.99,
                "price_currency": "USD",
                "supply_ability": 100,
                "minimum_order": 5,
                "internal_note": "do not leak"
            })
            .as_object()
            .cloned()
            .unwrap(),
            0.8,
        );

        let item = GroundedItem::from_hit(&hit);

        assert_eq!(item.id, PointId::Num(3));
        assert_eq!(item.payload.len(), OUTPUT_FIELDS.len());
        assert!(!item.payload.contains_key("internal_note"));
        assert_eq!(item.payload["price"], json!(9.99));
    }

    #[test]
    fn test_missing_store_fields_become_null() {
        let hit = SearchHit::new(
            PointId::Num(1),
            json!({"name": "Bare", "description": "No numbers"})
                .as_object()
                .cloned()
                .unwrap(),
            0.5,
        );

        let item = GroundedItem::from_hit(&hit);
        assert_eq!(item.payload["price"], Value::Null);
    }

    #[test]
    fn test_total_matches_answer_length() {
        let answer = GroundedAnswer::new("widget", vec![]);
        assert_eq!(answer.total, 0);
        assert!(answer.is_empty());
    }
}
