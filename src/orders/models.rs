//! Order Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer order. Item and address sub-documents are stored as JSON
/// text columns, so their shape can evolve without schema migrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub customer: Uuid,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub shipping: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_agent: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub full_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Delivery workflow states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    #[serde(rename = "Pending Pickup")]
    PendingPickup,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPickup => "Pending Pickup",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending Pickup" => Some(OrderStatus::PendingPickup),
            "Out for Delivery" => Some(OrderStatus::OutForDelivery),
            "Delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "PayPal")]
    PayPal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::PayPal => "PayPal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Credit Card" => Some(PaymentMethod::CreditCard),
            "Cash on Delivery" => Some(PaymentMethod::CashOnDelivery),
            "PayPal" => Some(PaymentMethod::PayPal),
            _ => None,
        }
    }
}

/// Fields needed to persist a new order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub payment_intent_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub customer: Uuid,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub shipping: f64,
    pub address: Option<Address>,
    pub delivery_agent: Option<Uuid>,
    pub notes: Option<String>,
}

pub const DEFAULT_SHIPPING: f64 = 5.99;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, r#""Out for Delivery""#);
        assert_eq!(
            OrderStatus::from_str("Pending Pickup"),
            Some(OrderStatus::PendingPickup)
        );
        assert_eq!(OrderStatus::from_str("Shipped"), None);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let m: PaymentMethod = serde_json::from_str(r#""Cash on Delivery""#).unwrap();
        assert_eq!(m, PaymentMethod::CashOnDelivery);
        assert_eq!(PaymentMethod::CreditCard.as_str(), "Credit Card");
    }
}
