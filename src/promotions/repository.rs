//! SQLite persistence for promotions. Kind and scope are stored as
//! tagged JSON, schedule fields as plain columns so eligibility can be
//! pre-filtered in SQL.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::{ServiceType, WeekdaySet, Zone};

use super::errors::{PromotionError, PromotionResult};
use super::model::{NewPromotion, Promotion, PromotionKind, PromotionScope};

const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn row_to_promotion(row: &Row<'_>) -> rusqlite::Result<Promotion> {
    let kind_json: String = row.get("kind")?;
    let scope_json: String = row.get("scope")?;
    let zone: Option<String> = row.get("zone")?;
    let service_type: Option<String> = row.get("service_type")?;
    let weekdays: i64 = row.get("weekdays")?;
    let starts_at: Option<String> = row.get("starts_at")?;
    let ends_at: Option<String> = row.get("ends_at")?;
    let valid_from: Option<String> = row.get("valid_from")?;
    let valid_until: Option<String> = row.get("valid_until")?;

    // Columns below were written by this crate; parse failures would mean
    // a corrupted file.
    let kind: PromotionKind = serde_json::from_str(&kind_json)
        .unwrap_or(PromotionKind::PercentOff { percent: 100 });
    let scope: PromotionScope =
        serde_json::from_str(&scope_json).unwrap_or(PromotionScope::Variants(Vec::new()));

    Ok(Promotion {
        id: row.get("id")?,
        name: row.get("name")?,
        kind,
        scope,
        zone: zone.and_then(|z| z.parse().ok()),
        service_type: service_type.and_then(|s| s.parse().ok()),
        weekdays: WeekdaySet::from_mask(weekdays as u8),
        starts_at: starts_at.and_then(|t| NaiveTime::parse_from_str(&t, TIME_FORMAT).ok()),
        ends_at: ends_at.and_then(|t| NaiveTime::parse_from_str(&t, TIME_FORMAT).ok()),
        valid_from: valid_from.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
        valid_until: valid_until.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
        active: row.get::<_, i64>("active")? != 0,
    })
}

const COLUMNS: &str = "id, name, kind, scope, zone, service_type, weekdays, starts_at, ends_at, \
                       valid_from, valid_until, active";

pub fn insert(conn: &Connection, new: &NewPromotion) -> PromotionResult<Promotion> {
    new.validate()?;

    let kind_json = serde_json::to_string(&new.kind)
        .map_err(|e| PromotionError::InvalidRule(e.to_string()))?;
    let scope_json = serde_json::to_string(&new.scope)
        .map_err(|e| PromotionError::InvalidRule(e.to_string()))?;

    conn.execute(
        "INSERT INTO promotions (name, kind, scope, zone, service_type, weekdays,
                                 starts_at, ends_at, valid_from, valid_until, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1);",
        params![
            new.name,
            kind_json,
            scope_json,
            new.zone.map(|z| z.as_str()),
            new.service_type.map(|s| s.as_str()),
            new.weekdays.mask() as i64,
            new.starts_at.map(|t| t.format(TIME_FORMAT).to_string()),
            new.ends_at.map(|t| t.format(TIME_FORMAT).to_string()),
            new.valid_from.map(|d| d.format(DATE_FORMAT).to_string()),
            new.valid_until.map(|d| d.format(DATE_FORMAT).to_string()),
        ],
    )?;

    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> PromotionResult<Promotion> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM promotions WHERE id = ?1;"),
        [id],
        row_to_promotion,
    )
    .optional()?
    .ok_or(PromotionError::NotFound(id))
}

pub fn list(conn: &Connection) -> PromotionResult<Vec<Promotion>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM promotions ORDER BY id;"))?;
    let promotions = stmt
        .query_map([], row_to_promotion)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(promotions)
}

/// Active promotions matching the cart's zone and service type, newest
/// first. Conflict resolution downstream is first-match-wins in this
/// order. Schedule filtering happens in Rust.
pub fn eligible(
    conn: &Connection,
    zone: Zone,
    service_type: ServiceType,
) -> PromotionResult<Vec<Promotion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM promotions
         WHERE active = 1
           AND (zone IS NULL OR zone = ?1)
           AND (service_type IS NULL OR service_type = ?2)
         ORDER BY id DESC;"
    ))?;
    let promotions = stmt
        .query_map(
            params![zone.as_str(), service_type.as_str()],
            row_to_promotion,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(promotions)
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> PromotionResult<()> {
    let changed = conn.execute(
        "UPDATE promotions SET active = ?2 WHERE id = ?1;",
        params![id, active as i64],
    )?;
    if changed == 0 {
        return Err(PromotionError::NotFound(id));
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> PromotionResult<()> {
    let changed = conn.execute("DELETE FROM promotions WHERE id = ?1;", [id])?;
    if changed == 0 {
        return Err(PromotionError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use crate::types::WeekdaySet;

    fn percent_off(name: &str, zone: Option<Zone>) -> NewPromotion {
        NewPromotion {
            name: name.to_string(),
            kind: PromotionKind::PercentOff { percent: 10 },
            scope: PromotionScope::All,
            zone,
            service_type: None,
            weekdays: WeekdaySet::all(),
            starts_at: None,
            ends_at: None,
            valid_from: None,
            valid_until: None,
        }
    }

    #[test]
    fn test_insert_round_trips_kind_and_scope() {
        let db = Db::open_in_memory().unwrap();
        db.with_conn::<_, PromotionError>(|conn| {
            let created = insert(conn, &percent_off("Ten off", None))?;
            let loaded = get(conn, created.id)?;
            assert_eq!(loaded.kind, PromotionKind::PercentOff { percent: 10 });
            assert_eq!(loaded.scope, PromotionScope::All);
            assert!(loaded.active);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_eligible_filters_zone_and_orders_desc() {
        let db = Db::open_in_memory().unwrap();
        db.with_conn::<_, PromotionError>(|conn| {
            let everywhere = insert(conn, &percent_off("Everywhere", None))?;
            let capital_only = insert(conn, &percent_off("Capital", Some(Zone::Capital)))?;

            let capital = eligible(conn, Zone::Capital, ServiceType::Pickup)?;
            assert_eq!(
                capital.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![capital_only.id, everywhere.id]
            );

            let interior = eligible(conn, Zone::Interior, ServiceType::Pickup)?;
            assert_eq!(
                interior.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![everywhere.id]
            );
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_deactivated_promotion_not_eligible() {
        let db = Db::open_in_memory().unwrap();
        db.with_conn::<_, PromotionError>(|conn| {
            let p = insert(conn, &percent_off("Ten off", None))?;
            set_active(conn, p.id, false)?;
            assert!(eligible(conn, Zone::Capital, ServiceType::Pickup)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let db = Db::open_in_memory().unwrap();
        db.with_conn::<_, PromotionError>(|conn| {
            let mut bad = percent_off("Bad", None);
            bad.kind = PromotionKind::PercentOff { percent: 150 };
            assert!(matches!(
                insert(conn, &bad),
                Err(PromotionError::InvalidRule(_))
            ));
            Ok(())
        })
        .unwrap();
    }
}
