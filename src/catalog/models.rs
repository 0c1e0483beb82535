//! Catalog Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product listing owned by a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub description: String,
    pub seller: Uuid,
    pub status: ProductStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Storefront categories, matching the front-end values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    #[serde(rename = "t-shirt")]
    TShirt,
    #[serde(rename = "hoodies")]
    Hoodies,
    #[serde(rename = "sweatshirt")]
    Sweatshirt,
    #[serde(rename = "tank")]
    Tank,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TShirt => "t-shirt",
            Category::Hoodies => "hoodies",
            Category::Sweatshirt => "sweatshirt",
            Category::Tank => "tank",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "t-shirt" => Some(Category::TShirt),
            "hoodies" => Some(Category::Hoodies),
            "sweatshirt" => Some(Category::Sweatshirt),
            "tank" => Some(Category::Tank),
            _ => None,
        }
    }
}

/// Moderation state. New listings start pending and only an admin moves
/// them to approved or rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
            ProductStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProductStatus::Pending),
            "approved" => Some(ProductStatus::Approved),
            "rejected" => Some(ProductStatus::Rejected),
            _ => None,
        }
    }
}

/// Fields a seller supplies when creating or replacing a listing.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: Category,
    pub image_url: Option<String>,
    pub description: String,
}
