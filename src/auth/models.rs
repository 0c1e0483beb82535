//! Authentication Models
//! Mission: Define user, role, and token data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

/// User roles. Single source of truth for every validation and
/// middleware site (the role set is not duplicated anywhere else).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // Moderates users, products, and orders
    #[serde(rename = "seller")]
    Seller, // Lists and manages own products
    #[serde(rename = "customer")]
    Customer, // Browses and purchases
    #[serde(rename = "deliveryAgent")]
    DeliveryAgent, // Fulfills assigned orders
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Customer => "customer",
            Role::DeliveryAgent => "deliveryAgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "seller" => Some(Role::Seller),
            "customer" => Some(Role::Customer),
            "deliveryAgent" => Some(Role::DeliveryAgent),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub role: Role,
    pub iat: usize, // issued-at timestamp
    pub exp: usize, // expiration timestamp
}

/// Per-request identity attached by the auth middleware.
///
/// Lives only for the duration of the request. `user_id` is the one
/// canonical name for the subject everywhere downstream.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

/// Registration request body
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Login request body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response for register/login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Identity response for GET /api/auth/me
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: Uuid,
    pub role: Role,
}
