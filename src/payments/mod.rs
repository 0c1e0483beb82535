//! Payments Module
//! Mission: Opaque checkout-session creation against the payment provider

pub mod api;

pub use api::CheckoutConfig;
