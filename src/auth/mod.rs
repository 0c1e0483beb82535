//! Authentication Module
//! Mission: Credential storage, token issuance, and role-gated access control

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, require_role, RequiredRoles};
pub use models::{AuthContext, Role};
pub use user_store::UserStore;
