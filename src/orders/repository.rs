//! SQLite persistence for franchises, orders, line snapshots, status
//! events and the activity feed.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{from_millis, to_millis};
use crate::types::{ServiceType, Zone};

use super::errors::{OrderError, OrderResult};
use super::model::{
    ActivityEntry, ActivityKind, Franchise, Order, OrderLine, OrderStatus, OrderWithLines,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ==================
// Franchises
// ==================

fn row_to_franchise(row: &Row<'_>) -> rusqlite::Result<Franchise> {
    Ok(Franchise {
        id: row.get("id")?,
        code: row.get("code")?,
        name: row.get("name")?,
        active: row.get::<_, i64>("active")? != 0,
    })
}

pub fn insert_franchise(conn: &Connection, code: &str, name: &str) -> OrderResult<Franchise> {
    conn.execute(
        "INSERT INTO franchises (code, name, active) VALUES (?1, ?2, 1);",
        params![code, name],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            OrderError::DuplicateFranchiseCode
        }
        other => OrderError::from(other),
    })?;

    Ok(Franchise {
        id: conn.last_insert_rowid(),
        code: code.to_string(),
        name: name.to_string(),
        active: true,
    })
}

pub fn get_franchise(conn: &Connection, id: i64) -> OrderResult<Franchise> {
    conn.query_row(
        "SELECT id, code, name, active FROM franchises WHERE id = ?1;",
        [id],
        row_to_franchise,
    )
    .optional()?
    .ok_or(OrderError::FranchiseNotFound(id))
}

pub fn list_franchises(conn: &Connection) -> OrderResult<Vec<Franchise>> {
    let mut stmt = conn.prepare("SELECT id, code, name, active FROM franchises ORDER BY id;")?;
    let franchises = stmt
        .query_map([], row_to_franchise)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(franchises)
}

pub fn set_franchise_active(conn: &Connection, id: i64, active: bool) -> OrderResult<()> {
    let changed = conn.execute(
        "UPDATE franchises SET active = ?2 WHERE id = ?1;",
        params![id, active as i64],
    )?;
    if changed == 0 {
        return Err(OrderError::FranchiseNotFound(id));
    }
    Ok(())
}

// ==================
// Orders
// ==================

fn row_to_order(row: &Row<'_>) -> rusqlite::Result<Order> {
    let user_id: Option<String> = row.get("user_id")?;
    let zone: String = row.get("zone")?;
    let service_type: String = row.get("service_type")?;
    let status: String = row.get("status")?;
    let local_date: String = row.get("local_date")?;

    Ok(Order {
        id: row.get("id")?,
        number: row.get("number")?,
        franchise_id: row.get("franchise_id")?,
        user_id: user_id.and_then(|u| Uuid::parse_str(&u).ok()),
        zone: zone.parse().unwrap_or(Zone::Capital),
        service_type: service_type.parse().unwrap_or(ServiceType::Pickup),
        status: status.parse().unwrap_or(OrderStatus::Pending),
        subtotal: row.get("subtotal")?,
        discount_total: row.get("discount_total")?,
        loyalty_credit: row.get("loyalty_credit")?,
        total: row.get("total")?,
        local_date: NaiveDate::parse_from_str(&local_date, DATE_FORMAT).unwrap_or_default(),
        seq: row.get("seq")?,
        placed_at: from_millis(row.get("placed_at")?),
        updated_at: from_millis(row.get("updated_at")?),
    })
}

const ORDER_COLUMNS: &str = "id, number, franchise_id, user_id, zone, service_type, status, \
                             subtotal, discount_total, loyalty_credit, total, local_date, seq, \
                             placed_at, updated_at";

pub fn insert_order(conn: &Connection, order: &Order) -> OrderResult<i64> {
    conn.execute(
        "INSERT INTO orders (number, franchise_id, user_id, zone, service_type, status,
                             subtotal, discount_total, loyalty_credit, total,
                             local_date, seq, placed_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
        params![
            order.number,
            order.franchise_id,
            order.user_id.map(|u| u.to_string()),
            order.zone.as_str(),
            order.service_type.as_str(),
            order.status.as_str(),
            order.subtotal,
            order.discount_total,
            order.loyalty_credit,
            order.total,
            order.local_date.format(DATE_FORMAT).to_string(),
            order.seq,
            to_millis(&order.placed_at),
            to_millis(&order.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_line(conn: &Connection, order_id: i64, line: &OrderLine) -> OrderResult<()> {
    conn.execute(
        "INSERT INTO order_lines (order_id, variant_id, display_name, unit_price, quantity,
                                  line_total)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            order_id,
            line.variant_id,
            line.display_name,
            line.unit_price,
            line.quantity,
            line.line_total,
        ],
    )?;
    Ok(())
}

pub fn get_order(conn: &Connection, id: i64) -> OrderResult<OrderWithLines> {
    let order = conn
        .query_row(
            &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1;"),
            [id],
            row_to_order,
        )
        .optional()?
        .ok_or(OrderError::NotFound(id))?;

    let mut stmt = conn.prepare(
        "SELECT id, order_id, variant_id, display_name, unit_price, quantity, line_total
         FROM order_lines WHERE order_id = ?1 ORDER BY id;",
    )?;
    let lines = stmt
        .query_map([id], |row| {
            Ok(OrderLine {
                id: row.get("id")?,
                order_id: row.get("order_id")?,
                variant_id: row.get("variant_id")?,
                display_name: row.get("display_name")?,
                unit_price: row.get("unit_price")?,
                quantity: row.get("quantity")?,
                line_total: row.get("line_total")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(OrderWithLines { order, lines })
}

/// Admin listing: per franchise, optionally one status, newest first.
pub fn list_orders(
    conn: &Connection,
    franchise_id: i64,
    status: Option<OrderStatus>,
    limit: u32,
    offset: u32,
) -> OrderResult<Vec<Order>> {
    let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE franchise_id = ?1");
    if status.is_some() {
        sql.push_str(" AND status = ?4");
    }
    sql.push_str(" ORDER BY id DESC LIMIT ?2 OFFSET ?3;");

    let mut stmt = conn.prepare(&sql)?;
    let orders = match status {
        Some(status) => stmt
            .query_map(
                params![franchise_id, limit, offset, status.as_str()],
                row_to_order,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        None => stmt
            .query_map(params![franchise_id, limit, offset], row_to_order)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
    };
    Ok(orders)
}

/// A customer's own orders, newest first.
pub fn list_orders_for_user(
    conn: &Connection,
    user_id: Uuid,
    limit: u32,
) -> OrderResult<Vec<Order>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2;"
    ))?;
    let orders = stmt
        .query_map(params![user_id.to_string(), limit], row_to_order)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(orders)
}

pub fn update_status(conn: &Connection, id: i64, status: OrderStatus) -> OrderResult<()> {
    let changed = conn.execute(
        "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1;",
        params![id, status.as_str(), to_millis(&Utc::now())],
    )?;
    if changed == 0 {
        return Err(OrderError::NotFound(id));
    }
    Ok(())
}

pub fn insert_event(
    conn: &Connection,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
    actor: Option<&str>,
) -> OrderResult<()> {
    conn.execute(
        "INSERT INTO order_events (order_id, from_status, to_status, actor, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            order_id,
            from.as_str(),
            to.as_str(),
            actor,
            to_millis(&Utc::now()),
        ],
    )?;
    Ok(())
}

/// Admin activity feed: order placements and status changes merged
/// newest-first.
pub fn activity_feed(conn: &Connection, limit: u32) -> OrderResult<Vec<ActivityEntry>> {
    let mut stmt = conn.prepare(
        "SELECT 'placed' AS kind, o.number AS number, NULL AS detail, o.placed_at AS at
         FROM orders o
         UNION ALL
         SELECT 'status', o.number, e.from_status || ' -> ' || e.to_status, e.created_at
         FROM order_events e
         JOIN orders o ON o.id = e.order_id
         ORDER BY at DESC, number DESC
         LIMIT ?1;",
    )?;

    let entries = stmt
        .query_map([limit], |row| {
            let kind: String = row.get("kind")?;
            Ok(ActivityEntry {
                kind: if kind == "placed" {
                    ActivityKind::OrderPlaced
                } else {
                    ActivityKind::StatusChanged
                },
                order_number: row.get("number")?,
                detail: row.get("detail")?,
                at: from_millis(row.get("at")?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}
