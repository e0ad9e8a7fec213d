//! # Loyalty Ledger
//!
//! Append-only point movements; the balance is the sum of deltas and
//! never goes negative because every debit is checked against it in the
//! same transaction.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{from_millis, to_millis};

use super::errors::{LoyaltyError, LoyaltyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    /// Points earned at checkout.
    Accrual,
    /// Points burned for order credit.
    Redemption,
    /// Manual staff correction.
    Adjustment,
}

impl LedgerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerReason::Accrual => "accrual",
            LedgerReason::Redemption => "redemption",
            LedgerReason::Adjustment => "adjustment",
        }
    }
}

impl FromStr for LedgerReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accrual" => Ok(LedgerReason::Accrual),
            "redemption" => Ok(LedgerReason::Redemption),
            "adjustment" => Ok(LedgerReason::Adjustment),
            other => Err(format!("unknown ledger reason `{other}`")),
        }
    }
}

impl fmt::Display for LedgerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: Uuid,
    pub delta: i64,
    pub reason: LedgerReason,
    pub order_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn balance(conn: &Connection, user_id: Uuid) -> LoyaltyResult<i64> {
    let balance: i64 = conn.query_row(
        "SELECT COALESCE(SUM(delta), 0) FROM loyalty_ledger WHERE user_id = ?1;",
        [user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(balance)
}

/// Record points earned for an order.
pub fn record_accrual(
    conn: &Connection,
    user_id: Uuid,
    points: i64,
    order_id: i64,
) -> LoyaltyResult<()> {
    if points <= 0 {
        return Ok(());
    }
    append(conn, user_id, points, LedgerReason::Accrual, Some(order_id), None)
}

/// Burn points for an order; checked against the balance so the sum of
/// deltas stays non-negative.
pub fn record_redemption(
    conn: &Connection,
    user_id: Uuid,
    points: i64,
    order_id: i64,
) -> LoyaltyResult<()> {
    if points <= 0 {
        return Ok(());
    }

    let available = balance(conn, user_id)?;
    if points > available {
        return Err(LoyaltyError::InsufficientBalance {
            requested: points,
            available,
        });
    }

    append(
        conn,
        user_id,
        -points,
        LedgerReason::Redemption,
        Some(order_id),
        None,
    )
}

/// Manual adjustment. May be negative, but never below a zero balance.
pub fn record_adjustment(
    conn: &Connection,
    user_id: Uuid,
    delta: i64,
    note: &str,
) -> LoyaltyResult<()> {
    if delta == 0 {
        return Err(LoyaltyError::InvalidAdjustment(
            "delta must not be zero".to_string(),
        ));
    }

    if delta < 0 {
        let available = balance(conn, user_id)?;
        if -delta > available {
            return Err(LoyaltyError::InsufficientBalance {
                requested: -delta,
                available,
            });
        }
    }

    append(conn, user_id, delta, LedgerReason::Adjustment, None, Some(note))
}

/// Statement, newest first.
pub fn statement(conn: &Connection, user_id: Uuid, limit: u32) -> LoyaltyResult<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, delta, reason, order_id, note, created_at
         FROM loyalty_ledger WHERE user_id = ?1
         ORDER BY id DESC LIMIT ?2;",
    )?;
    let entries = stmt
        .query_map(params![user_id.to_string(), limit], |row| {
            let user_id_text: String = row.get("user_id")?;
            let reason: String = row.get("reason")?;
            Ok(LedgerEntry {
                id: row.get("id")?,
                user_id: Uuid::parse_str(&user_id_text).unwrap_or_default(),
                delta: row.get("delta")?,
                reason: reason.parse().unwrap_or(LedgerReason::Adjustment),
                order_id: row.get("order_id")?,
                note: row.get("note")?,
                created_at: from_millis(row.get("created_at")?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn append(
    conn: &Connection,
    user_id: Uuid,
    delta: i64,
    reason: LedgerReason,
    order_id: Option<i64>,
    note: Option<&str>,
) -> LoyaltyResult<()> {
    conn.execute(
        "INSERT INTO loyalty_ledger (user_id, delta, reason, order_id, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            user_id.to_string(),
            delta,
            reason.as_str(),
            order_id,
            note,
            to_millis(&Utc::now()),
        ],
    )?;
    Ok(())
}
