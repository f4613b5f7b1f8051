use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a point in the vector store.
///
/// Qdrant only accepts unsigned integers and UUIDs. Catalog ids that are
/// neither are mapped onto a name-based UUID so repeated ingestion of the
/// same record always targets the same point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl PointId {
    pub fn from_record_id(record_id: &str) -> Self {
        let trimmed = record_id.trim();
        if let Ok(num) = trimmed.parse::<u64>() {
            return Self::Num(num);
        }
        if let Ok(uuid) = Uuid::parse_str(trimmed) {
            return Self::Uuid(uuid.hyphenated().to_string());
        }
        Self::Uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, trimmed.as_bytes()).to_string())
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Num(num) => write!(f, "{}", num),
            PointId::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

/// Similarity metric used when creating a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Euclid,
    Dot,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Euclid => "Euclid",
            Distance::Dot => "Dot",
        }
    }
}

/// Flat payload stored next to each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub price_currency: String,
    pub supply_ability: u32,
    pub minimum_order: u32,
}

/// A vector plus payload, ready to be upserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPoint {
    pub id: PointId,
    pub vector: Vec<f32>,
    pub payload: ProductPayload,
}

impl IndexedPoint {
    pub fn new(id: PointId, vector: Vec<f32>, payload: ProductPayload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_are_kept() {
        assert_eq!(PointId::from_record_id("42"), PointId::Num(42));
    }

    #[test]
    fn test_uuid_ids_are_kept() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(PointId::from_record_id(id), PointId::Uuid(id.to_string()));
    }

    #[test]
    fn test_other_ids_map_to_stable_uuid() {
        let first = PointId::from_record_id("P1");
        let second = PointId::from_record_id("P1");
        let other = PointId::from_record_id("P2");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(matches!(first, PointId::Uuid(_)));
    }

    #[test]
    fn test_point_id_serializes_untagged() {
        assert_eq!(serde_json::to_value(PointId::Num(7)).unwrap(), 7);
        let parsed: PointId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(parsed, PointId::Uuid("abc".to_string()));
    }
}
