//! SQLite persistence for zone prices and daily specials.

use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::{Money, ServiceType, WeekdaySet, Zone};

use super::errors::{PricingError, PricingResult};
use super::model::{DailySpecial, ZonePrice};

const TIME_FORMAT: &str = "%H:%M:%S";

fn time_to_sql(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

fn time_from_sql(text: &str) -> NaiveTime {
    // Written by this crate via `time_to_sql`.
    NaiveTime::parse_from_str(text, TIME_FORMAT).unwrap_or_default()
}

pub fn upsert_zone_price(conn: &Connection, price: &ZonePrice) -> PricingResult<()> {
    if price.price < 0 {
        return Err(PricingError::NegativePrice);
    }

    conn.execute(
        "INSERT INTO zone_prices (variant_id, zone, service_type, price)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (variant_id, zone, service_type) DO UPDATE SET price = excluded.price;",
        params![
            price.variant_id,
            price.zone.as_str(),
            price.service_type.as_str(),
            price.price,
        ],
    )?;
    Ok(())
}

pub fn zone_price(
    conn: &Connection,
    variant_id: i64,
    zone: Zone,
    service_type: ServiceType,
) -> PricingResult<Option<Money>> {
    let price = conn
        .query_row(
            "SELECT price FROM zone_prices
             WHERE variant_id = ?1 AND zone = ?2 AND service_type = ?3;",
            params![variant_id, zone.as_str(), service_type.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(price)
}

pub fn list_zone_prices(conn: &Connection, variant_id: i64) -> PricingResult<Vec<ZonePrice>> {
    let mut stmt = conn.prepare(
        "SELECT variant_id, zone, service_type, price FROM zone_prices
         WHERE variant_id = ?1 ORDER BY zone, service_type;",
    )?;
    let prices = stmt
        .query_map([variant_id], |row| {
            let zone: String = row.get("zone")?;
            let service: String = row.get("service_type")?;
            Ok(ZonePrice {
                variant_id: row.get("variant_id")?,
                zone: zone.parse().unwrap_or(Zone::Capital),
                service_type: service.parse().unwrap_or(ServiceType::Pickup),
                price: row.get("price")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(prices)
}

fn row_to_special(row: &Row<'_>) -> rusqlite::Result<DailySpecial> {
    let starts: String = row.get("starts_at")?;
    let ends: String = row.get("ends_at")?;
    let weekdays: i64 = row.get("weekdays")?;

    Ok(DailySpecial {
        id: row.get("id")?,
        variant_id: row.get("variant_id")?,
        special_price: row.get("special_price")?,
        weekdays: WeekdaySet::from_mask(weekdays as u8),
        starts_at: time_from_sql(&starts),
        ends_at: time_from_sql(&ends),
        active: row.get::<_, i64>("active")? != 0,
    })
}

pub fn insert_special(
    conn: &Connection,
    variant_id: i64,
    special_price: Money,
    weekdays: WeekdaySet,
    starts_at: NaiveTime,
    ends_at: NaiveTime,
) -> PricingResult<DailySpecial> {
    if special_price < 0 {
        return Err(PricingError::NegativePrice);
    }
    if weekdays.is_empty() {
        return Err(PricingError::InvalidWindow(
            "weekday set must not be empty".to_string(),
        ));
    }
    if starts_at == ends_at {
        return Err(PricingError::InvalidWindow(
            "window must not be zero-length".to_string(),
        ));
    }

    conn.execute(
        "INSERT INTO daily_specials (variant_id, special_price, weekdays, starts_at, ends_at, active)
         VALUES (?1, ?2, ?3, ?4, ?5, 1);",
        params![
            variant_id,
            special_price,
            weekdays.mask() as i64,
            time_to_sql(starts_at),
            time_to_sql(ends_at),
        ],
    )?;

    Ok(DailySpecial {
        id: conn.last_insert_rowid(),
        variant_id,
        special_price,
        weekdays,
        starts_at,
        ends_at,
        active: true,
    })
}

/// Active specials for one variant, newest first: the newest matching
/// entry wins when windows overlap.
pub fn active_specials_for_variant(
    conn: &Connection,
    variant_id: i64,
) -> PricingResult<Vec<DailySpecial>> {
    let mut stmt = conn.prepare(
        "SELECT id, variant_id, special_price, weekdays, starts_at, ends_at, active
         FROM daily_specials
         WHERE variant_id = ?1 AND active = 1
         ORDER BY id DESC;",
    )?;
    let specials = stmt
        .query_map([variant_id], row_to_special)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(specials)
}

pub fn list_specials(conn: &Connection) -> PricingResult<Vec<DailySpecial>> {
    let mut stmt = conn.prepare(
        "SELECT id, variant_id, special_price, weekdays, starts_at, ends_at, active
         FROM daily_specials ORDER BY id;",
    )?;
    let specials = stmt
        .query_map([], row_to_special)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(specials)
}

pub fn set_special_active(conn: &Connection, id: i64, active: bool) -> PricingResult<()> {
    let changed = conn.execute(
        "UPDATE daily_specials SET active = ?2 WHERE id = ?1;",
        params![id, active as i64],
    )?;
    if changed == 0 {
        return Err(PricingError::SpecialNotFound(id));
    }
    Ok(())
}

pub fn delete_special(conn: &Connection, id: i64) -> PricingResult<()> {
    let changed = conn.execute("DELETE FROM daily_specials WHERE id = ?1;", [id])?;
    if changed == 0 {
        return Err(PricingError::SpecialNotFound(id));
    }
    Ok(())
}
