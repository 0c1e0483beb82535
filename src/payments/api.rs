//! Payments API Endpoints
//! Mission: Create hosted checkout sessions via the Stripe REST API
//!
//! The backend only brokers the session; amounts, currency handling, and
//! payment state all live with the provider.

use crate::{error::ApiError, AppState};
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

const FALLBACK_IMAGE: &str = "https://via.placeholder.com/150";

/// Provider configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub secret_key: Option<String>,
    /// Provider base URL; overridable so tests can point elsewhere.
    pub api_url: String,
    pub frontend_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_url: "https://api.stripe.com".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/payments/create-checkout-session",
            post(create_checkout_session),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CheckoutRequest {
    cart_items: Vec<CartItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CartItem {
    name: String,
    price: f64,
    quantity: u32,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

/// POST /api/payments/create-checkout-session
async fn create_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.cart_items.is_empty() {
        return Err(ApiError::Validation("Cart is empty"));
    }

    let Some(secret_key) = state.checkout.secret_key.as_deref() else {
        error!("STRIPE_SECRET_KEY not configured; cannot create checkout session");
        return Err(ApiError::Payment);
    };

    let form = session_form(&payload.cart_items, &state.checkout.frontend_url);

    let resp = state
        .http_client
        .post(format!("{}/v1/checkout/sessions", state.checkout.api_url))
        .bearer_auth(secret_key)
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            warn!("Checkout session request failed: {}", e);
            ApiError::Payment
        })?;

    if !resp.status().is_success() {
        warn!(status = %resp.status(), "Checkout session rejected by provider");
        return Err(ApiError::Payment);
    }

    let session = resp.json::<CheckoutSession>().await.map_err(|e| {
        warn!("Unreadable checkout session response: {}", e);
        ApiError::Payment
    })?;

    let url = session.url.ok_or_else(|| {
        warn!("Checkout session response carried no url");
        ApiError::Payment
    })?;

    Ok(Json(json!({ "url": url })))
}

/// Encode the cart as Stripe's form-style nested parameters.
fn session_form(items: &[CartItem], frontend_url: &str) -> Vec<(String, String)> {
    let mut form = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let image = match item.image.as_deref() {
            Some(url) if url.starts_with("http") => url,
            _ => FALLBACK_IMAGE,
        };
        let unit_amount = (item.price * 100.0).round() as i64;

        form.push((
            format!("line_items[{i}][price_data][currency]"),
            "usd".to_string(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][images][0]"),
            image.to_string(),
        ));
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            unit_amount.to_string(),
        ));
        form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }

    form.push(("mode".to_string(), "payment".to_string()));
    form.push((
        "payment_method_types[0]".to_string(),
        "card".to_string(),
    ));
    form.push((
        "success_url".to_string(),
        format!("{frontend_url}/success"),
    ));
    form.push(("cancel_url".to_string(), format!("{frontend_url}/cart")));

    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn find<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_session_form_encodes_cart() {
        let items = vec![
            CartItem {
                name: "Hoodie".to_string(),
                price: 29.99,
                quantity: 2,
                image: Some("https://cdn.example.com/h.png".to_string()),
            },
            CartItem {
                name: "Tee".to_string(),
                price: 10.0,
                quantity: 1,
                image: Some("/uploads/images/t.png".to_string()),
            },
        ];

        let form = session_form(&items, "https://shop.example.com");

        // Prices are converted to integer cents.
        assert_eq!(
            find(&form, "line_items[0][price_data][unit_amount]"),
            Some("2999")
        );
        assert_eq!(find(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            find(&form, "line_items[0][price_data][product_data][images][0]"),
            Some("https://cdn.example.com/h.png")
        );

        // Relative image paths fall back to the placeholder.
        assert_eq!(
            find(&form, "line_items[1][price_data][product_data][images][0]"),
            Some(FALLBACK_IMAGE)
        );

        assert_eq!(find(&form, "mode"), Some("payment"));
        assert_eq!(
            find(&form, "success_url"),
            Some("https://shop.example.com/success")
        );
        assert_eq!(
            find(&form, "cancel_url"),
            Some("https://shop.example.com/cart")
        );
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_any_provider_call() {
        let (state, _tmp) = test_state();
        let app = router(state);

        let req = Request::builder()
            .uri("/api/payments/create-checkout-session")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"cartItems": []}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_provider_key_is_500() {
        let (state, _tmp) = test_state();
        // test_state ships without a provider key
        assert!(state.checkout.secret_key.is_none());
        let app = router(state);

        let req = Request::builder()
            .uri("/api/payments/create-checkout-session")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"cartItems": [{"name": "Tee", "price": 10.0, "quantity": 1}]}"#,
            ))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
