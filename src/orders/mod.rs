//! Orders Module
//! Mission: Order records and the delivery workflow

pub mod api;
pub mod models;
pub mod store;

pub use models::{Order, OrderStatus, PaymentMethod};
pub use store::OrderStore;
