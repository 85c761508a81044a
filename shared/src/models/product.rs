//! Product Model

use super::order::PaymentMethod;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_quantity_per_box() -> i64 {
    1
}

/// Catalog entry (`produtos` table)
///
/// `stock` is measured in boxes; `quantity_per_box` is the base-unit
/// multiplier (1 for products sold individually).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    /// Merchant code shown in the catalog
    pub codigo: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Cash-equivalent list price per base unit
    pub price_vista: f64,
    /// Card/installment list price per base unit
    pub price_cartao: f64,
    #[serde(default = "default_quantity_per_box")]
    pub quantity_per_box: i64,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Stock in boxes
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Product {
    /// List price per base unit for the given payment mode
    pub fn unit_price(&self, method: PaymentMethod) -> f64 {
        match method {
            PaymentMethod::Vista => self.price_vista,
            PaymentMethod::Cartao => self.price_cartao,
        }
    }

    /// Base units per box, never below 1
    pub fn units_per_box(&self) -> i64 {
        self.quantity_per_box.max(1)
    }
}

/// Create product payload
///
/// Validation here is advisory (client-side); the backend's own
/// policies are the enforcement point.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "codigo is required"))]
    pub codigo: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, message = "price_vista must be non-negative"))]
    pub price_vista: f64,
    #[validate(range(min = 0.0, message = "price_cartao must be non-negative"))]
    pub price_cartao: f64,
    #[validate(range(min = 1, message = "quantity_per_box must be at least 1"))]
    pub quantity_per_box: i64,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[validate(range(min = 0, message = "stock must be non-negative"))]
    pub stock: i64,
}

/// Update product payload (images are managed separately)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_vista: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cartao: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_per_box: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn product(vista: f64, cartao: f64, per_box: i64) -> Product {
        Product {
            id: "p1".into(),
            codigo: "C-001".into(),
            name: "Papai Noel".into(),
            subgroup: None,
            description: String::new(),
            price_vista: vista,
            price_cartao: cartao,
            quantity_per_box: per_box,
            colors: vec![],
            image_urls: vec!["https://x/produtos/a.jpg".into()],
            stock: 5,
            created_at: None,
        }
    }

    #[test]
    fn test_unit_price_by_mode() {
        let p = product(10.0, 12.5, 10);
        assert_eq!(p.unit_price(PaymentMethod::Vista), 10.0);
        assert_eq!(p.unit_price(PaymentMethod::Cartao), 12.5);
    }

    #[test]
    fn test_units_per_box_never_zero() {
        let mut p = product(1.0, 1.0, 0);
        assert_eq!(p.units_per_box(), 1);
        p.quantity_per_box = 12;
        assert_eq!(p.units_per_box(), 12);
    }

    #[test]
    fn test_quantity_per_box_defaults_on_missing_column() {
        let row = serde_json::json!({
            "id": "p2",
            "codigo": "C-002",
            "name": "Guirlanda",
            "price_vista": 5.0,
            "price_cartao": 6.0,
            "stock": 3
        });
        let p: Product = serde_json::from_value(row).unwrap();
        assert_eq!(p.quantity_per_box, 1);
        assert!(p.image_urls.is_empty());
    }

    #[test]
    fn test_new_product_validation() {
        let ok = NewProduct {
            codigo: "C-003".into(),
            name: "Sino".into(),
            subgroup: None,
            description: String::new(),
            price_vista: 4.0,
            price_cartao: 4.5,
            quantity_per_box: 1,
            colors: vec![],
            image_urls: vec![],
            stock: 10,
        };
        assert!(ok.validate().is_ok());

        let bad = NewProduct {
            codigo: String::new(),
            price_vista: -1.0,
            ..ok
        };
        assert!(bad.validate().is_err());
    }
}
