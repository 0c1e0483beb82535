//! Catalog Module
//! Mission: Product listings, seller ownership, and admin moderation

pub mod api;
pub mod models;
pub mod store;

pub use models::{Category, Product, ProductStatus};
pub use store::ProductStore;
