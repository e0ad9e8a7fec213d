//! # Order Number Generator
//!
//! Numbers look like `CEN-20260804-0017`: franchise code, local date,
//! then a per-franchise per-day sequence starting at 1. The next value
//! is derived by scanning the highest existing sequence inside the
//! caller's immediate transaction, so concurrent checkouts serialize on
//! the write lock; the UNIQUE index on (franchise_id, local_date, seq)
//! backstops the invariant.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::errors::OrderResult;

pub fn next(
    conn: &Connection,
    franchise_id: i64,
    franchise_code: &str,
    local_date: NaiveDate,
) -> OrderResult<(String, i64)> {
    let seq: i64 = conn.query_row(
        "SELECT COALESCE(MAX(seq), 0) + 1 FROM orders
         WHERE franchise_id = ?1 AND local_date = ?2;",
        params![franchise_id, local_date.format("%Y-%m-%d").to_string()],
        |row| row.get(0),
    )?;

    let number = format!(
        "{}-{}-{:04}",
        franchise_code,
        local_date.format("%Y%m%d"),
        seq
    );
    Ok((number, seq))
}
