//! # Users
//!
//! User model and SQLite persistence. Password hashes never leave this
//! module in serialized form; social-only accounts have no hash at all.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{from_millis, to_millis};

use super::crypto::{hash_password, PasswordRules};
use super::errors::{AuthError, AuthResult};
use super::permissions::Role;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles"));

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    /// Unique, stored lowercase.
    pub email: String,

    /// Argon2id hash; `None` for accounts created through social login.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub display_name: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a password-backed account.
    pub fn new_with_password(
        email: String,
        display_name: String,
        role: Role,
        password: &str,
        rules: &PasswordRules,
    ) -> AuthResult<Self> {
        let email = normalize_email(&email)?;
        rules.validate(password)?;
        let password_hash = Some(hash_password(password)?);

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            role,
            email_verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create an account from a verified identity-provider profile.
    pub fn new_social(email: String, display_name: String) -> AuthResult<Self> {
        let email = normalize_email(&email)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash: None,
            display_name,
            role: Role::Customer,
            email_verified: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        match &self.password_hash {
            Some(hash) => super::crypto::verify_password(password, hash),
            None => Ok(false),
        }
    }
}

/// Lowercase, trim and validate an email address.
pub fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail)
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ==================
// SQLite persistence
// ==================

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let id_text: String = row.get("id")?;
    let role_text: String = row.get("role")?;
    let created: i64 = row.get("created_at")?;
    let updated: i64 = row.get("updated_at")?;

    Ok(User {
        id: Uuid::parse_str(&id_text).unwrap_or_default(),
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        display_name: row.get("display_name")?,
        role: role_text.parse().unwrap_or(Role::Customer),
        email_verified: row.get::<_, i64>("email_verified")? != 0,
        created_at: from_millis(created),
        updated_at: from_millis(updated),
    })
}

const USER_COLUMNS: &str =
    "id, email, password_hash, display_name, role, email_verified, created_at, updated_at";

pub fn insert(conn: &Connection, user: &User) -> AuthResult<()> {
    conn.execute(
        "INSERT INTO users (id, email, password_hash, display_name, role, email_verified,
                            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            user.id.to_string(),
            user.email,
            user.password_hash,
            user.display_name,
            user.role.as_str(),
            user.email_verified as i64,
            to_millis(&user.created_at),
            to_millis(&user.updated_at),
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> AuthResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1;"),
            [id.to_string()],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn find_by_email(conn: &Connection, email: &str) -> AuthResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1;"),
            [email],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn email_exists(conn: &Connection, email: &str) -> AuthResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1);",
        [email],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub fn list(conn: &Connection) -> AuthResult<Vec<User>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at;"))?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

pub fn set_role(conn: &Connection, id: Uuid, role: Role) -> AuthResult<()> {
    let changed = conn.execute(
        "UPDATE users SET role = ?2, updated_at = ?3 WHERE id = ?1;",
        params![id.to_string(), role.as_str(), to_millis(&Utc::now())],
    )?;
    if changed == 0 {
        return Err(AuthError::UserNotFound);
    }
    Ok(())
}
