//! SQLite persistence for carts. Combo selections are stored as JSON on
//! the line row.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{from_millis, to_millis};
use crate::types::{ServiceType, Zone};

use super::errors::{CartError, CartResult};
use super::model::{Cart, CartLine, CartWithLines, ComboSelection};

pub fn create(
    conn: &Connection,
    user_id: Option<Uuid>,
    zone: Zone,
    service_type: ServiceType,
) -> CartResult<Cart> {
    let now = Utc::now();
    let cart = Cart {
        id: Uuid::new_v4(),
        user_id,
        zone,
        service_type,
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO carts (id, user_id, zone, service_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            cart.id.to_string(),
            cart.user_id.map(|u| u.to_string()),
            cart.zone.as_str(),
            cart.service_type.as_str(),
            to_millis(&cart.created_at),
            to_millis(&cart.updated_at),
        ],
    )?;

    Ok(cart)
}

pub fn get(conn: &Connection, id: Uuid) -> CartResult<CartWithLines> {
    let cart = conn
        .query_row(
            "SELECT id, user_id, zone, service_type, created_at, updated_at
             FROM carts WHERE id = ?1;",
            [id.to_string()],
            |row| {
                let id_text: String = row.get("id")?;
                let user_id: Option<String> = row.get("user_id")?;
                let zone: String = row.get("zone")?;
                let service_type: String = row.get("service_type")?;
                Ok(Cart {
                    id: Uuid::parse_str(&id_text).unwrap_or_default(),
                    user_id: user_id.and_then(|u| Uuid::parse_str(&u).ok()),
                    zone: zone.parse().unwrap_or(Zone::Capital),
                    service_type: service_type.parse().unwrap_or(ServiceType::Pickup),
                    created_at: from_millis(row.get("created_at")?),
                    updated_at: from_millis(row.get("updated_at")?),
                })
            },
        )
        .optional()?
        .ok_or(CartError::NotFound(id))?;

    let mut stmt = conn.prepare(
        "SELECT id, variant_id, quantity, combo_selections
         FROM cart_lines WHERE cart_id = ?1 ORDER BY id;",
    )?;
    let lines = stmt
        .query_map([id.to_string()], |row| {
            let selections_json: String = row.get("combo_selections")?;
            let combo_selections: Vec<ComboSelection> =
                serde_json::from_str(&selections_json).unwrap_or_default();
            Ok(CartLine {
                id: row.get("id")?,
                variant_id: row.get("variant_id")?,
                quantity: row.get("quantity")?,
                combo_selections,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(CartWithLines { cart, lines })
}

pub fn add_line(
    conn: &Connection,
    cart_id: Uuid,
    variant_id: i64,
    quantity: i64,
    combo_selections: &[ComboSelection],
) -> CartResult<CartLine> {
    let selections_json = serde_json::to_string(combo_selections)
        .map_err(|e| CartError::Storage(e.to_string()))?;

    conn.execute(
        "INSERT INTO cart_lines (cart_id, variant_id, quantity, combo_selections)
         VALUES (?1, ?2, ?3, ?4);",
        params![cart_id.to_string(), variant_id, quantity, selections_json],
    )?;
    touch(conn, cart_id)?;

    Ok(CartLine {
        id: conn.last_insert_rowid(),
        variant_id,
        quantity,
        combo_selections: combo_selections.to_vec(),
    })
}

pub fn set_line_quantity(
    conn: &Connection,
    cart_id: Uuid,
    line_id: i64,
    quantity: i64,
) -> CartResult<()> {
    let changed = if quantity == 0 {
        conn.execute(
            "DELETE FROM cart_lines WHERE id = ?1 AND cart_id = ?2;",
            params![line_id, cart_id.to_string()],
        )?
    } else {
        conn.execute(
            "UPDATE cart_lines SET quantity = ?3 WHERE id = ?1 AND cart_id = ?2;",
            params![line_id, cart_id.to_string(), quantity],
        )?
    };

    if changed == 0 {
        return Err(CartError::LineNotFound(line_id));
    }
    touch(conn, cart_id)
}

pub fn remove_line(conn: &Connection, cart_id: Uuid, line_id: i64) -> CartResult<()> {
    let changed = conn.execute(
        "DELETE FROM cart_lines WHERE id = ?1 AND cart_id = ?2;",
        params![line_id, cart_id.to_string()],
    )?;
    if changed == 0 {
        return Err(CartError::LineNotFound(line_id));
    }
    touch(conn, cart_id)
}

pub fn delete(conn: &Connection, cart_id: Uuid) -> CartResult<()> {
    conn.execute(
        "DELETE FROM cart_lines WHERE cart_id = ?1;",
        [cart_id.to_string()],
    )?;
    conn.execute("DELETE FROM carts WHERE id = ?1;", [cart_id.to_string()])?;
    Ok(())
}

fn touch(conn: &Connection, cart_id: Uuid) -> CartResult<()> {
    conn.execute(
        "UPDATE carts SET updated_at = ?2 WHERE id = ?1;",
        params![cart_id.to_string(), to_millis(&Utc::now())],
    )?;
    Ok(())
}
