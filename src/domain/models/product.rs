use serde::{Deserialize, Serialize};

use super::{PointId, ProductPayload};

/// A single catalog entry as loaded from the supplier file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub price_currency: String,
    pub supply_ability: u32,
    pub minimum_order: u32,
}

impl ProductRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        price_currency: impl Into<String>,
        supply_ability: u32,
        minimum_order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            price_currency: price_currency.into(),
            supply_ability,
            minimum_order,
        }
    }

    /// Canonical text submitted to the embedding model.
    ///
    /// Stored vectors are only comparable while this template stays fixed.
    pub fn embedding_input(&self) -> String {
        format!(
            "{}. {}. The price is {:.2} {}. Minimum order: {} units. Supply ability: {} units.",
            self.name,
            self.description,
            self.price,
            self.price_currency,
            self.minimum_order,
            self.supply_ability,
        )
    }

    pub fn payload(&self) -> ProductPayload {
        ProductPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            price_currency: self.price_currency.clone(),
            supply_ability: self.supply_ability,
            minimum_order: self.minimum_order,
        }
    }

    pub fn point_id(&self) -> PointId {
        PointId::from_record_id(&self.id)
    }
}
