//! # Sessions
//!
//! Refresh-token sessions. The raw token is handed to the client once;
//! only its digest is stored. Refresh rotates the session, so a token
//! can be redeemed a single time; logout revokes immediately.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{from_millis, to_millis};

use super::crypto::{generate_token, hash_token};
use super::errors::{AuthError, AuthResult};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,

    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub refresh_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_ttl: Duration::days(30),
        }
    }
}

/// Create a session row and return it with the raw refresh token.
pub fn create(
    conn: &Connection,
    config: &SessionConfig,
    user_id: Uuid,
    user_agent: Option<String>,
    ip_address: Option<String>,
) -> AuthResult<(Session, String)> {
    let refresh_token = generate_token();
    let now = Utc::now();

    let session = Session {
        id: Uuid::new_v4(),
        user_id,
        refresh_token_hash: hash_token(&refresh_token),
        created_at: now,
        expires_at: now + config.refresh_ttl,
        revoked: false,
        user_agent,
        ip_address,
    };

    conn.execute(
        "INSERT INTO sessions (id, user_id, refresh_token_hash, created_at, expires_at,
                               revoked, user_agent, ip_address)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7);",
        params![
            session.id.to_string(),
            session.user_id.to_string(),
            session.refresh_token_hash,
            to_millis(&session.created_at),
            to_millis(&session.expires_at),
            session.user_agent,
            session.ip_address,
        ],
    )?;

    Ok((session, refresh_token))
}

/// Look up the live session for a raw refresh token and validate it.
pub fn validate_refresh_token(conn: &Connection, refresh_token: &str) -> AuthResult<Session> {
    let session = find_by_token_hash(conn, &hash_token(refresh_token))?
        .ok_or(AuthError::InvalidRefreshToken)?;

    if session.revoked {
        return Err(AuthError::SessionRevoked);
    }
    if session.expires_at < Utc::now() {
        return Err(AuthError::SessionInvalid);
    }

    Ok(session)
}

/// Redeem a refresh token: revoke the old session, mint a replacement.
pub fn rotate(
    conn: &Connection,
    config: &SessionConfig,
    refresh_token: &str,
) -> AuthResult<(Session, String)> {
    let old = validate_refresh_token(conn, refresh_token)?;
    revoke(conn, old.id)?;
    create(conn, config, old.user_id, old.user_agent, old.ip_address)
}

pub fn revoke(conn: &Connection, id: Uuid) -> AuthResult<()> {
    conn.execute(
        "UPDATE sessions SET revoked = 1 WHERE id = ?1;",
        [id.to_string()],
    )?;
    Ok(())
}

pub fn revoke_all_for_user(conn: &Connection, user_id: Uuid) -> AuthResult<()> {
    conn.execute(
        "UPDATE sessions SET revoked = 1 WHERE user_id = ?1;",
        [user_id.to_string()],
    )?;
    Ok(())
}

fn find_by_token_hash(conn: &Connection, token_hash: &str) -> AuthResult<Option<Session>> {
    let session = conn
        .query_row(
            "SELECT id, user_id, refresh_token_hash, created_at, expires_at, revoked,
                    user_agent, ip_address
             FROM sessions WHERE refresh_token_hash = ?1;",
            [token_hash],
            row_to_session,
        )
        .optional()?;
    Ok(session)
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    let id: String = row.get("id")?;
    let user_id: String = row.get("user_id")?;

    // Values below were written by this crate; parse failures would mean
    // a corrupted file.
    Ok(Session {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        user_id: Uuid::parse_str(&user_id).unwrap_or_default(),
        refresh_token_hash: row.get("refresh_token_hash")?,
        created_at: from_millis(row.get("created_at")?),
        expires_at: from_millis(row.get("expires_at")?),
        revoked: row.get::<_, i64>("revoked")? != 0,
        user_agent: row.get("user_agent")?,
        ip_address: row.get("ip_address")?,
    })
}
