//! Versioned schema migrations.
//!
//! Each entry is one migration batch; the applied count is tracked in
//! SQLite's `user_version` pragma. Running migrations is idempotent and
//! re-entrant: already-applied batches are skipped, a database created by
//! a newer binary is rejected.

use rusqlite::Connection;

use super::errors::{DbError, DbResult};

const MIGRATIONS: &[&str] = &[
    // v1: full initial schema
    "
    CREATE TABLE users (
        id              TEXT PRIMARY KEY,
        email           TEXT NOT NULL UNIQUE,
        password_hash   TEXT,
        display_name    TEXT NOT NULL,
        role            TEXT NOT NULL,
        email_verified  INTEGER NOT NULL DEFAULT 0,
        created_at      INTEGER NOT NULL,
        updated_at      INTEGER NOT NULL
    );

    CREATE TABLE sessions (
        id                  TEXT PRIMARY KEY,
        user_id             TEXT NOT NULL REFERENCES users(id),
        refresh_token_hash  TEXT NOT NULL UNIQUE,
        created_at          INTEGER NOT NULL,
        expires_at          INTEGER NOT NULL,
        revoked             INTEGER NOT NULL DEFAULT 0,
        user_agent          TEXT,
        ip_address          TEXT
    );

    CREATE TABLE categories (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        name      TEXT NOT NULL UNIQUE,
        position  INTEGER NOT NULL,
        active    INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE products (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        category_id  INTEGER NOT NULL REFERENCES categories(id),
        name         TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        kind         TEXT NOT NULL DEFAULT 'simple',
        position     INTEGER NOT NULL,
        active       INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE variants (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id  INTEGER NOT NULL REFERENCES products(id),
        name        TEXT NOT NULL,
        position    INTEGER NOT NULL,
        active      INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE combo_groups (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id  INTEGER NOT NULL REFERENCES products(id),
        name        TEXT NOT NULL,
        position    INTEGER NOT NULL
    );

    CREATE TABLE combo_options (
        group_id    INTEGER NOT NULL REFERENCES combo_groups(id),
        variant_id  INTEGER NOT NULL REFERENCES variants(id),
        surcharge   INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (group_id, variant_id)
    );

    CREATE TABLE zone_prices (
        variant_id    INTEGER NOT NULL REFERENCES variants(id),
        zone          TEXT NOT NULL,
        service_type  TEXT NOT NULL,
        price         INTEGER NOT NULL,
        PRIMARY KEY (variant_id, zone, service_type)
    );

    CREATE TABLE daily_specials (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        variant_id     INTEGER NOT NULL REFERENCES variants(id),
        special_price  INTEGER NOT NULL,
        weekdays       INTEGER NOT NULL,
        starts_at      TEXT NOT NULL,
        ends_at        TEXT NOT NULL,
        active         INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE promotions (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        kind          TEXT NOT NULL,
        scope         TEXT NOT NULL,
        zone          TEXT,
        service_type  TEXT,
        weekdays      INTEGER NOT NULL,
        starts_at     TEXT,
        ends_at       TEXT,
        valid_from    TEXT,
        valid_until   TEXT,
        active        INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE carts (
        id            TEXT PRIMARY KEY,
        user_id       TEXT REFERENCES users(id),
        zone          TEXT NOT NULL,
        service_type  TEXT NOT NULL,
        created_at    INTEGER NOT NULL,
        updated_at    INTEGER NOT NULL
    );

    CREATE TABLE cart_lines (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        cart_id           TEXT NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
        variant_id        INTEGER NOT NULL REFERENCES variants(id),
        quantity          INTEGER NOT NULL,
        combo_selections  TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE franchises (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        code    TEXT NOT NULL UNIQUE,
        name    TEXT NOT NULL,
        active  INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE orders (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        number          TEXT NOT NULL UNIQUE,
        franchise_id    INTEGER NOT NULL REFERENCES franchises(id),
        user_id         TEXT REFERENCES users(id),
        zone            TEXT NOT NULL,
        service_type    TEXT NOT NULL,
        status          TEXT NOT NULL,
        subtotal        INTEGER NOT NULL,
        discount_total  INTEGER NOT NULL,
        loyalty_credit  INTEGER NOT NULL,
        total           INTEGER NOT NULL,
        local_date      TEXT NOT NULL,
        seq             INTEGER NOT NULL,
        placed_at       INTEGER NOT NULL,
        updated_at      INTEGER NOT NULL,
        UNIQUE (franchise_id, local_date, seq)
    );

    CREATE TABLE order_lines (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id      INTEGER NOT NULL REFERENCES orders(id),
        variant_id    INTEGER NOT NULL,
        display_name  TEXT NOT NULL,
        unit_price    INTEGER NOT NULL,
        quantity      INTEGER NOT NULL,
        line_total    INTEGER NOT NULL
    );

    CREATE TABLE order_events (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id     INTEGER NOT NULL REFERENCES orders(id),
        from_status  TEXT NOT NULL,
        to_status    TEXT NOT NULL,
        actor        TEXT,
        created_at   INTEGER NOT NULL
    );

    CREATE TABLE loyalty_ledger (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     TEXT NOT NULL REFERENCES users(id),
        delta       INTEGER NOT NULL,
        reason      TEXT NOT NULL,
        order_id    INTEGER,
        note        TEXT,
        created_at  INTEGER NOT NULL
    );

    CREATE TABLE devices (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id        TEXT NOT NULL REFERENCES users(id),
        fcm_token      TEXT NOT NULL UNIQUE,
        platform       TEXT NOT NULL,
        registered_at  INTEGER NOT NULL
    );

    CREATE INDEX idx_products_category ON products(category_id);
    CREATE INDEX idx_variants_product ON variants(product_id);
    CREATE INDEX idx_orders_franchise_date ON orders(franchise_id, local_date);
    CREATE INDEX idx_orders_user ON orders(user_id);
    CREATE INDEX idx_ledger_user ON loyalty_ledger(user_id);
    CREATE INDEX idx_devices_user ON devices(user_id);
    ",
];

/// Latest schema version this binary writes.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

/// Apply any missing migrations to `conn`.
pub fn apply(conn: &Connection) -> DbResult<()> {
    let current: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();

    if current > supported {
        return Err(DbError::VersionTooNew {
            found: current,
            supported,
        });
    }

    for (index, batch) in MIGRATIONS.iter().enumerate() {
        let version = index as i64 + 1;
        if version <= current {
            continue;
        }
        conn.execute_batch(batch)?;
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        conn
    }

    #[test]
    fn test_apply_creates_schema() {
        let conn = fresh_conn();
        apply(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'orders';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let conn = fresh_conn();
        apply(&conn).unwrap();
        apply(&conn).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = fresh_conn();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();

        let err = apply(&conn).unwrap_err();
        assert!(matches!(err, DbError::VersionTooNew { .. }));
    }
}
