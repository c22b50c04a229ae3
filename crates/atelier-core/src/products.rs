use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product normalized from one spreadsheet row, ready to insert.
///
/// The row normalizer only emits values that pass [`NewProduct::is_persistable`];
/// the database enforces the same rules with `CHECK` constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    /// Price in rubles, e.g. `27000.00`. `None` when the sheet cell is blank
    /// or could not be read as a number.
    pub price: Option<Decimal>,
    pub stock: i32,
    /// Absolute `http(s)` URL of the primary product image.
    pub image_url_1: Option<String>,
    pub image_url_2: Option<String>,
}

impl NewProduct {
    /// Returns `true` if the product satisfies the persisted-row invariant.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        !self.name.trim().is_empty() && self.stock > 0
    }
}

/// A row from the `products` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub image_url_1: Option<String>,
    pub image_url_2: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vase() -> NewProduct {
        NewProduct {
            name: "Vase A".to_string(),
            brand: Some("Lalique".to_string()),
            price: Some(Decimal::new(120_000, 2)),
            stock: 5,
            image_url_1: None,
            image_url_2: Some("https://cdn.example.com/vase-b.jpg".to_string()),
        }
    }

    #[test]
    fn is_persistable_requires_name_and_positive_stock() {
        assert!(vase().is_persistable());
        assert!(!NewProduct {
            name: "  ".to_string(),
            ..vase()
        }
        .is_persistable());
        assert!(!NewProduct { stock: 0, ..vase() }.is_persistable());
    }

    #[test]
    fn new_product_serializes_price_as_string() {
        let json = serde_json::to_value(vase()).expect("serialize");
        assert_eq!(json["price"], "1200.00");
        assert_eq!(json["stock"], 5);
        assert!(json["image_url_1"].is_null());
    }
}
