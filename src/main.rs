//! Storefront - Multi-role e-commerce API server
//! Mission: Role-gated CRUD for customers, sellers, delivery agents, and admins
//!
//! Customers browse and purchase, sellers manage listings, delivery agents
//! fulfil orders, and admins moderate everything. Authentication is a
//! stateless bearer token; authorization is a per-router allowed-role set.

mod auth;
mod catalog;
mod error;
mod middleware;
mod models;
mod orders;
mod payments;

use anyhow::{Context, Result};
use axum::{http::HeaderValue, routing::get, Json, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    auth::{JwtHandler, UserStore},
    catalog::ProductStore,
    middleware::{throttle_middleware, LoginThrottle},
    models::Config,
    orders::OrderStore,
    payments::CheckoutConfig,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub products: Arc<ProductStore>,
    pub orders: Arc<OrderStore>,
    pub jwt: Arc<JwtHandler>,
    pub http_client: reqwest::Client,
    pub checkout: CheckoutConfig,
}

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Multi-role storefront API server")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
    /// SQLite database path (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    info!("🛍️  Storefront backend starting");

    let state = build_state(&config)?;
    let app = build_app(state, &config)?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let users = Arc::new(UserStore::new(&config.database_path, config.bcrypt_cost)?);
    let products = Arc::new(ProductStore::new(&config.database_path)?);
    let orders = Arc::new(OrderStore::new(&config.database_path)?);
    let jwt = Arc::new(JwtHandler::new(
        config.jwt_secret.clone(),
        config.jwt_expiry_hours,
    ));

    Ok(AppState {
        users,
        products,
        orders,
        jwt,
        http_client: reqwest::Client::new(),
        checkout: CheckoutConfig {
            secret_key: config.stripe_secret_key.clone(),
            api_url: config.stripe_api_url.clone(),
            frontend_url: config.frontend_url.clone(),
        },
    })
}

fn build_app(state: AppState, config: &Config) -> Result<Router> {
    let throttle = LoginThrottle::new(config.login_rate_limit, Duration::from_secs(60));

    // Credential endpoints carry the brute-force throttle.
    let auth_routes = auth::api::router(state.clone()).layer(
        axum::middleware::from_fn_with_state(throttle, throttle_middleware),
    );

    let admin_routes = auth::api::admin_router(state.clone())
        .merge(catalog::api::admin_router(state.clone()))
        .merge(orders::api::admin_router(state.clone()));

    let seller_routes = catalog::api::seller_router(state.clone());
    let delivery_routes = orders::api::delivery_router(state.clone());
    let customer_routes = orders::api::customer_router(state.clone());
    let payment_routes = payments::api::router(state);

    let public_routes = Router::new().route("/health", get(health_check));

    let cors = match config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .context("Invalid CORS_ORIGIN")?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    Ok(Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(seller_routes)
        .merge(delivery_routes)
        .merge(customer_routes)
        .merge(payment_routes)
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_logging)))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Initialize tracing with env-driven filtering
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
