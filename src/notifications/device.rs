//! # Device Registry
//!
//! FCM device tokens per user. A token re-registered by a different
//! user re-binds to them (shared tablets, reinstalls).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{from_millis, to_millis};

use super::errors::{NotifyError, NotifyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            other => Err(format!("unknown platform `{other}`")),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub id: i64,
    pub user_id: Uuid,
    pub fcm_token: String,
    pub platform: Platform,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDevice {
    pub fcm_token: String,
    pub platform: Platform,
}

/// Upsert by token: an existing registration moves to the new user.
pub fn register(
    conn: &Connection,
    user_id: Uuid,
    token: &str,
    platform: Platform,
) -> NotifyResult<()> {
    conn.execute(
        "INSERT INTO devices (user_id, fcm_token, platform, registered_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (fcm_token) DO UPDATE SET
             user_id = excluded.user_id,
             platform = excluded.platform,
             registered_at = excluded.registered_at;",
        params![
            user_id.to_string(),
            token,
            platform.as_str(),
            to_millis(&Utc::now()),
        ],
    )?;
    Ok(())
}

pub fn unregister(conn: &Connection, user_id: Uuid, token: &str) -> NotifyResult<()> {
    let changed = conn.execute(
        "DELETE FROM devices WHERE fcm_token = ?1 AND user_id = ?2;",
        params![token, user_id.to_string()],
    )?;
    if changed == 0 {
        return Err(NotifyError::DeviceNotFound);
    }
    Ok(())
}

/// Drop a token FCM reported as dead.
pub fn prune(conn: &Connection, token: &str) -> NotifyResult<()> {
    conn.execute("DELETE FROM devices WHERE fcm_token = ?1;", [token])?;
    Ok(())
}

pub fn tokens_for_user(conn: &Connection, user_id: Uuid) -> NotifyResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT fcm_token FROM devices WHERE user_id = ?1 ORDER BY id;")?;
    let tokens = stmt
        .query_map([user_id.to_string()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tokens)
}

pub fn list_for_user(conn: &Connection, user_id: Uuid) -> NotifyResult<Vec<Device>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, fcm_token, platform, registered_at
         FROM devices WHERE user_id = ?1 ORDER BY id;",
    )?;
    let devices = stmt
        .query_map([user_id.to_string()], |row| {
            let user_id_text: String = row.get("user_id")?;
            let platform: String = row.get("platform")?;
            Ok(Device {
                id: row.get("id")?,
                user_id: Uuid::parse_str(&user_id_text).unwrap_or_default(),
                fcm_token: row.get("fcm_token")?,
                platform: platform.parse().unwrap_or(Platform::Android),
                registered_at: from_millis(row.get("registered_at")?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(devices)
}
