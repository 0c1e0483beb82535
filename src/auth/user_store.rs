//! User Storage
//! Mission: Persist user identity, hashed secrets, and roles in SQLite

use crate::auth::models::{Role, User};
use anyhow::Result;
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

/// Credential store failures.
///
/// `InvalidCredentials` covers both unknown email and wrong password with
/// one message, so the API cannot be used to enumerate accounts.
#[derive(Debug)]
pub enum StoreError {
    Validation(&'static str),
    DuplicateEmail,
    InvalidCredentials,
    Hash(bcrypt::BcryptError),
    Database(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "{}", msg),
            StoreError::DuplicateEmail => write!(f, "Email already registered"),
            StoreError::InvalidCredentials => write!(f, "Invalid credentials"),
            StoreError::Hash(e) => write!(f, "Password hashing failed: {}", e),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        // The only UNIQUE constraint on the users table is the email
        // column, so a constraint violation on insert is the
        // authoritative duplicate signal (no check-then-insert race).
        match &e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Database(e),
        }
    }
}

impl From<bcrypt::BcryptError> for StoreError {
    fn from(e: bcrypt::BcryptError) -> Self {
        StoreError::Hash(e)
    }
}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
    bcrypt_cost: u32,
}

impl UserStore {
    /// Create a user store and initialize the schema.
    pub fn new(db_path: &str, bcrypt_cost: u32) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
            bcrypt_cost,
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Register a new user.
    ///
    /// Email is normalized (lowercased, trimmed) before storage so the
    /// uniqueness check is case-insensitive. The password is hashed with
    /// bcrypt; plaintext never touches the database.
    pub fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let full_name = full_name.trim();
        let email = normalize_email(email);

        if full_name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(StoreError::Validation("All fields are required"));
        }

        let password_hash = hash(password, self.bcrypt_cost)?;
        let now = Utc::now().to_rfc3339();

        let user = User {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email,
            password_hash,
            role,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, full_name, email, password_hash, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.full_name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
                user.updated_at,
            ],
        )?;

        info!("Registered user {} ({})", user.email, user.role.as_str());
        Ok(user)
    }

    /// Verify email/password and return the matching user.
    ///
    /// Unknown email and wrong password fail identically.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let email = normalize_email(email);

        let user = self
            .get_user_by_email(&email)?
            .ok_or(StoreError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)?;
        if !valid {
            return Err(StoreError::InvalidCredentials);
        }

        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, password_hash, role, created_at, updated_at
             FROM users WHERE email = ?1",
        )?;

        let user = stmt
            .query_row(params![normalize_email(email)], row_to_user)
            .optional()?;
        Ok(user)
    }

    pub fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, password_hash, role, created_at, updated_at
             FROM users WHERE id = ?1",
        )?;

        let user = stmt
            .query_row(params![id.to_string()], row_to_user)
            .optional()?;
        Ok(user)
    }

    /// List all users (admin only).
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, password_hash, role, created_at, updated_at
             FROM users ORDER BY created_at",
        )?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Delete a user by id (admin only). Returns false if no such user.
    pub fn delete_user(&self, id: &Uuid) -> Result<bool, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        if rows > 0 {
            info!("Deleted user {}", id);
        }
        Ok(rows > 0)
    }

    /// Change a user's role (admin only). Returns the updated user.
    pub fn update_role(&self, id: &Uuid, role: Role) -> Result<Option<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                role.as_str(),
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        info!("Updated role of {} to {}", id, role.as_str());
        self.get_user(id)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let role: String = row.get(4)?;
    Ok(User {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        full_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::from_str(&role).unwrap_or_default(),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
