//! Order Model

use super::product::Product;
use super::shipping::PostalAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status, stored as the Portuguese wire strings
///
/// Sellers may move their own Pendente orders to Cancelado; every other
/// transition belongs to the administrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    Pendente,
    #[serde(rename = "Em Processamento")]
    EmProcessamento,
    Enviado,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    /// All statuses in their fixed order
    pub fn all() -> [OrderStatus; 5] {
        [
            Self::Pendente,
            Self::EmProcessamento,
            Self::Enviado,
            Self::Entregue,
            Self::Cancelado,
        ]
    }

    /// Wire string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::EmProcessamento => "Em Processamento",
            Self::Enviado => "Enviado",
            Self::Entregue => "Entregue",
            Self::Cancelado => "Cancelado",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pendente)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment mode: cash-equivalent or card pricing track
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Vista,
    Cartao,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vista => "vista",
            Self::Cartao => "cartao",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery address fields as stored on the order header
///
/// `numero` and `complemento` are always typed by the user; the rest
/// comes from the postal lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeliveryAddress {
    pub logradouro: String,
    pub numero: String,
    pub complemento: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
}

impl DeliveryAddress {
    /// Build from a postal lookup result, leaving numero/complemento empty
    pub fn from_postal(postal: &PostalAddress) -> Self {
        Self {
            logradouro: postal.logradouro.clone(),
            numero: String::new(),
            complemento: String::new(),
            bairro: postal.bairro.clone(),
            cidade: postal.cidade.clone(),
            estado: postal.estado.clone(),
        }
    }
}

/// Order entity (`pedidos` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    pub user_id: String,
    /// Goods plus selected shipping
    pub total_price: f64,
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub logradouro: Option<String>,
    #[serde(default)]
    pub numero: Option<String>,
    #[serde(default)]
    pub complemento: Option<String>,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub cidade: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// Line items, hydrated by the orders service
    #[serde(default)]
    pub pedido_items: Vec<OrderItem>,
    /// Seller display name, hydrated from `profiles` for the admin view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
}

/// Order line item (`pedido_items` table)
///
/// `price_at_purchase` is captured at submission time so historical
/// orders stay accurate when list prices change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub pedido_id: String,
    pub produto_id: String,
    /// Quantity in base units
    pub quantity: i64,
    pub price_at_purchase: f64,
    /// Product row, hydrated by the orders service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produto: Option<Product>,
}

/// Create order header payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub total_price: f64,
    pub shipping_cost: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub cep: String,
    pub logradouro: String,
    pub numero: String,
    pub complemento: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    /// Fresh per submission attempt
    pub idempotency_key: String,
}

/// Create order line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub pedido_id: String,
    pub produto_id: String,
    pub quantity: i64,
    pub price_at_purchase: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::EmProcessamento).unwrap(),
            "\"Em Processamento\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"Cancelado\"").unwrap(),
            OrderStatus::Cancelado
        );
        for status in OrderStatus::all() {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(serde_json::from_str::<OrderStatus>(&json).unwrap(), status);
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_payment_method_wire_strings() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Vista).unwrap(), "\"vista\"");
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"cartao\"").unwrap(),
            PaymentMethod::Cartao
        );
    }

    #[test]
    fn test_order_deserializes_without_joins() {
        let row = serde_json::json!({
            "id": "o1",
            "created_at": "2024-07-01T12:00:00Z",
            "user_id": "u1",
            "total_price": 130.5,
            "shipping_cost": 30.5,
            "status": "Pendente",
            "payment_method": "vista"
        });
        let order: Order = serde_json::from_value(row).unwrap();
        assert!(order.status.is_pending());
        assert!(order.pedido_items.is_empty());
        assert!(order.seller_name.is_none());
    }

    #[test]
    fn test_address_from_postal_leaves_numero_empty() {
        let postal = PostalAddress {
            logradouro: "Rua das Flores".into(),
            bairro: "Centro".into(),
            cidade: "Curitiba".into(),
            estado: "PR".into(),
        };
        let addr = DeliveryAddress::from_postal(&postal);
        assert_eq!(addr.logradouro, "Rua das Flores");
        assert!(addr.numero.is_empty());
        assert!(addr.complemento.is_empty());
    }
}
