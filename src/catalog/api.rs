//! Catalog API Endpoints
//! Mission: Seller product CRUD and admin moderation

use crate::{
    auth::{
        middleware::{auth_middleware, require_role, RequiredRoles},
        models::{AuthContext, Role},
    },
    catalog::models::{Category, Product, ProductDraft, ProductStatus},
    error::ApiError,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Seller-only product management, scoped to the authenticated seller.
pub fn seller_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/seller/products",
            get(list_my_products).post(create_product),
        )
        .route(
            "/api/seller/products/:id",
            get(get_my_product).put(update_product).delete(delete_product),
        )
        .route("/api/seller/dashboard-stats", get(dashboard_stats))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles(&[Role::Seller]),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

/// Admin-only product moderation.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(list_all_products))
        .route("/api/products/:id/approve", put(approve_product))
        .route("/api/products/:id/reject", put(reject_product))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles(&[Role::Admin]),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProductRequest {
    name: String,
    price: Option<f64>,
    stock: Option<i64>,
    category: String,
    description: String,
    image_url: Option<String>,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft, ApiError> {
        if self.name.trim().is_empty()
            || self.category.is_empty()
            || self.description.trim().is_empty()
            || self.price.is_none()
        {
            return Err(ApiError::Validation("All fields are required"));
        }

        let price = self.price.unwrap_or_default();
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::Validation("Invalid price"));
        }

        let category =
            Category::from_str(&self.category).ok_or(ApiError::Validation("Invalid category"))?;

        Ok(ProductDraft {
            name: self.name.trim().to_string(),
            price,
            stock: self.stock.unwrap_or(0),
            category,
            image_url: self.image_url,
            description: self.description.trim().to_string(),
        })
    }
}

/// GET /api/seller/products
async fn list_my_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let products = state.products.list_for_seller(&ctx.user_id)?;
    Ok(Json(json!({ "products": products })))
}

/// GET /api/seller/products/:id
async fn get_my_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .get_for_seller(&id, &ctx.user_id)?
        .ok_or(ApiError::NotFound("Product not found"))?;
    Ok(Json(product))
}

/// POST /api/seller/products
async fn create_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let draft = payload.into_draft()?;
    let product = state.products.create(ctx.user_id, draft)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/seller/products/:id
async fn update_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let draft = payload.into_draft()?;
    let product = state
        .products
        .update_for_seller(&id, &ctx.user_id, draft)?
        .ok_or(ApiError::NotFound("Product not found"))?;
    Ok(Json(product))
}

/// DELETE /api/seller/products/:id
async fn delete_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.products.delete_for_seller(&id, &ctx.user_id)? {
        return Err(ApiError::NotFound("Product not found"));
    }
    Ok(Json(json!({ "message": "Product deleted" })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardStats {
    total_products: usize,
    total_orders: usize,
    total_revenue: f64,
}

/// GET /api/seller/dashboard-stats
async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<DashboardStats>, ApiError> {
    let ids = state.products.ids_for_seller(&ctx.user_id)?;
    let (total_orders, total_revenue) = state.orders.stats_for_products(&ids)?;

    Ok(Json(DashboardStats {
        total_products: ids.len(),
        total_orders,
        total_revenue,
    }))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

/// GET /api/products?status=
async fn list_all_products(
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let status = match params.status.as_deref() {
        Some(s) => Some(
            ProductStatus::from_str(s).ok_or(ApiError::Validation("Invalid status filter"))?,
        ),
        None => None,
    };

    let products = state.products.list(status)?;
    Ok(Json(json!({ "products": products })))
}

/// PUT /api/products/:id/approve
async fn approve_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    moderate(&state, &id, ProductStatus::Approved, "Product approved")
}

/// PUT /api/products/:id/reject
async fn reject_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    moderate(&state, &id, ProductStatus::Rejected, "Product rejected")
}

fn moderate(
    state: &AppState,
    id: &Uuid,
    status: ProductStatus,
    message: &str,
) -> Result<Json<Value>, ApiError> {
    let product = state
        .products
        .set_status(id, status)?
        .ok_or(ApiError::NotFound("Product not found"))?;
    Ok(Json(json!({ "message": message, "product": product })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn authed_json(uri: &str, method: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header("Authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed(uri: &str, method: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn seller_token(state: &AppState, email: &str) -> (Uuid, String) {
        let user = state
            .users
            .register("Sam", email, "p", Role::Seller)
            .unwrap();
        (user.id, state.jwt.issue(user.id, user.role).unwrap())
    }

    #[tokio::test]
    async fn test_seller_crud_flow() {
        let (state, _tmp) = test_state();
        let app = seller_router(state.clone());
        let (_, token) = seller_token(&state, "sam@x.com");

        let res = app
            .clone()
            .oneshot(authed_json(
                "/api/seller/products",
                "POST",
                &token,
                json!({
                    "name": "Hoodie",
                    "price": 29.99,
                    "category": "hoodies",
                    "description": "warm",
                    "imageUrl": "/uploads/images/h.png"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = body_json(res).await;
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(authed("/api/seller/products", "GET", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["products"].as_array().unwrap().len(), 1);

        let res = app
            .clone()
            .oneshot(authed_json(
                &format!("/api/seller/products/{id}"),
                "PUT",
                &token,
                json!({
                    "name": "Hoodie XL",
                    "price": 34.99,
                    "category": "hoodies",
                    "description": "warm"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let updated = body_json(res).await;
        assert_eq!(updated["name"], "Hoodie XL");
        // Image survives an update without a new one.
        assert_eq!(updated["imageUrl"], "/uploads/images/h.png");

        let res = app
            .clone()
            .oneshot(authed(&format!("/api/seller/products/{id}"), "DELETE", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(authed(&format!("/api/seller/products/{id}"), "GET", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sellers_cannot_touch_foreign_products() {
        let (state, _tmp) = test_state();
        let app = seller_router(state.clone());
        let (owner_id, _) = seller_token(&state, "owner@x.com");
        let (_, intruder_token) = seller_token(&state, "intruder@x.com");

        let product = state
            .products
            .create(
                owner_id,
                ProductDraft {
                    name: "Tank".to_string(),
                    price: 9.99,
                    stock: 1,
                    category: Category::Tank,
                    image_url: None,
                    description: "light".to_string(),
                },
            )
            .unwrap();

        let res = app
            .clone()
            .oneshot(authed(
                &format!("/api/seller/products/{}", product.id),
                "GET",
                &intruder_token,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .oneshot(authed(
                &format!("/api/seller/products/{}", product.id),
                "DELETE",
                &intruder_token,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_customer_token_rejected_on_seller_routes() {
        let (state, _tmp) = test_state();
        let app = seller_router(state.clone());

        let customer = state
            .users
            .register("Cal", "cal@x.com", "p", Role::Customer)
            .unwrap();
        let token = state.jwt.issue(customer.id, customer.role).unwrap();

        let res = app
            .oneshot(authed("/api/seller/products", "GET", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_moderation() {
        let (state, _tmp) = test_state();
        let app = admin_router(state.clone());
        let (seller_id, _) = seller_token(&state, "sam@x.com");

        let admin = state
            .users
            .register("Root", "root@x.com", "p", Role::Admin)
            .unwrap();
        let token = state.jwt.issue(admin.id, admin.role).unwrap();

        let product = state
            .products
            .create(
                seller_id,
                ProductDraft {
                    name: "Tee".to_string(),
                    price: 9.99,
                    stock: 3,
                    category: Category::TShirt,
                    image_url: None,
                    description: "basic".to_string(),
                },
            )
            .unwrap();

        let res = app
            .clone()
            .oneshot(authed(
                &format!("/api/products/{}/approve", product.id),
                "PUT",
                &token,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["product"]["status"], "approved");

        let res = app
            .clone()
            .oneshot(authed("/api/products?status=approved", "GET", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["products"].as_array().unwrap().len(), 1);

        let res = app
            .oneshot(authed("/api/products?status=bogus", "GET", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_stats_cover_only_own_products() {
        let (state, _tmp) = test_state();
        let app = seller_router(state.clone());
        let (seller_id, token) = seller_token(&state, "sam@x.com");

        let mine = state
            .products
            .create(
                seller_id,
                ProductDraft {
                    name: "Tee".to_string(),
                    price: 10.0,
                    stock: 3,
                    category: Category::TShirt,
                    image_url: None,
                    description: "basic".to_string(),
                },
            )
            .unwrap();

        state
            .orders
            .create(crate::orders::models::OrderDraft {
                payment_intent_id: None,
                payment_method: crate::orders::models::PaymentMethod::CashOnDelivery,
                customer: Uuid::new_v4(),
                items: vec![crate::orders::models::OrderItem {
                    product_id: mine.id.to_string(),
                    name: "Tee".to_string(),
                    quantity: 2,
                    price: 10.0,
                    size: None,
                    color: None,
                    image_url: None,
                }],
                total: 20.0,
                shipping: 5.99,
                address: None,
                delivery_agent: None,
                notes: None,
            })
            .unwrap();

        let res = app
            .oneshot(authed("/api/seller/dashboard-stats", "GET", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let stats = body_json(res).await;
        assert_eq!(stats["totalProducts"], 1);
        assert_eq!(stats["totalOrders"], 1);
        assert_eq!(stats["totalRevenue"], 20.0);
    }
}
