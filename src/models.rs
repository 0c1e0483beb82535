//! Application configuration.

use anyhow::Context;

/// Runtime configuration, resolved once at startup from the environment
/// (with `.env` support).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origin: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_url: String,
    pub frontend_url: String,
    /// Auth attempts allowed per IP per minute.
    pub login_rate_limit: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./storefront.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5002".to_string())
            .parse()
            .unwrap_or(5002);

        // The signing secret has no safe default.
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let jwt_expiry_hours = std::env::var("JWT_EXPIRES_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let bcrypt_cost = std::env::var("BCRYPT_COST")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let cors_origin = std::env::var("CORS_ORIGIN").ok();

        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY").ok();

        let stripe_api_url = std::env::var("STRIPE_API_URL")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let login_rate_limit = std::env::var("LOGIN_RATE_LIMIT")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            jwt_expiry_hours,
            bcrypt_cost,
            cors_origin,
            stripe_secret_key,
            stripe_api_url,
            frontend_url,
            login_rate_limit,
        })
    }
}
